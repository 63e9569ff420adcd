//! Top-level parallel execution strategies.
//!
//! Both strategies tie a splitter, a tokenizer, and worker-local finding
//! batches together and emit a globally ordered result: the total finding
//! count to a count sink (exactly once, first), then each finding to an
//! item sink in ascending `(line, column)` order.
//!
//! - [`divide_and_conquer`] needs a random-access region: it cuts the
//!   region into per-worker subregions on delimiter boundaries and lets
//!   each worker split and tokenize its subregion independently.
//! - [`round_robin`] works with any chunk producer, including streams: the
//!   calling thread pulls chunks in order and deals them out to dedicated
//!   consumer threads.

mod divide_and_conquer;
mod round_robin;

pub use divide_and_conquer::divide_and_conquer;
pub use round_robin::round_robin;

use std::error::Error;
use std::fmt;

use crate::exec::TaskPanic;

/// A strategy run failed; the sinks were not invoked.
#[derive(Debug)]
#[non_exhaustive]
pub enum StrategyError {
    /// A worker thread or chunk handler panicked. Worker-local results are
    /// unreliable, so no output was produced.
    WorkerPanicked,
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerPanicked => write!(f, "a search worker panicked"),
        }
    }
}

impl Error for StrategyError {}

impl From<TaskPanic> for StrategyError {
    fn from(_: TaskPanic) -> Self {
        Self::WorkerPanicked
    }
}
