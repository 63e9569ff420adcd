//! Concurrent task execution.
//!
//! Two runtimes, matched to the two strategies:
//!
//! - [`TaskPool`]: a fixed pool of workers over a shared FIFO, used by
//!   divide-and-conquer to run one opaque task per subregion.
//! - [`ChunkPipeline`]: a dedicated consumer thread fed through a bounded
//!   SPSC ring, used by round-robin to stream chunks at one worker.
//!
//! Both are built on scoped threads so tasks and handlers may borrow the
//! source region for the duration of a strategy run.

mod chunk_pipeline;
mod task_pool;

pub use chunk_pipeline::{ChunkPipeline, CHUNK_QUEUE_CAPACITY};
pub use task_pool::{TaskPanic, TaskPool};
