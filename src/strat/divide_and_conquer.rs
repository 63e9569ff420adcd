//! Divide-and-conquer over a random-access region.
//!
//! The region is cut into at most W contiguous subregions of roughly equal
//! size. Each tentative cut is advanced to the next delimiter and then past
//! the whole run of delimiters, so every delimiter belongs to the subregion
//! on its left. Consequences:
//!
//! - No line straddles a cut, so no match can either.
//! - Every subregion after the first starts at a line start, so per-worker
//!   line counts are additive and global line numbers can be recovered by
//!   rebasing (see [`emit_rebased`]).
//!
//! When the region has fewer delimiters than workers, fewer subregions are
//! produced and the excess workers simply receive no task.

use std::thread;

use memchr::memchr;

use crate::exec::TaskPool;
use crate::findings::{emit_rebased, Finding, WorkerBatch};
use crate::search::Searcher;
use crate::split::RegionSplitter;
use crate::strat::StrategyError;
use crate::tokenize::Tokenizer;

/// Cuts `region` into at most `parts` delimiter-aligned subregions.
fn partition(region: &[u8], parts: usize, delim: u8) -> Vec<&[u8]> {
    let span = (region.len() / parts).max(1);
    let mut subregions = Vec::with_capacity(parts);

    let mut start = 0usize;
    let mut index = 0usize;
    while start < region.len() {
        let end = if index + 1 < parts {
            let tentative = (start + span).min(region.len());
            let mut end = match memchr(delim, &region[tentative..]) {
                Some(pos) => tentative + pos,
                None => region.len(),
            };
            // The delimiter run at the boundary belongs to this subregion.
            while end < region.len() && region[end] == delim {
                end += 1;
            }
            end
        } else {
            region.len()
        };
        subregions.push(&region[start..end]);
        start = end;
        index += 1;
    }

    subregions
}

/// Searches `region` with `workers` threads and emits ordered findings.
///
/// The count sink receives the total exactly once, before any item; items
/// arrive in ascending `(line, column)` order with borrowed match text.
/// On worker panic neither sink is invoked.
pub fn divide_and_conquer<'a, S, N, F>(
    region: &'a [u8],
    tokenizer: &Tokenizer<S>,
    delim: u8,
    workers: usize,
    count_sink: N,
    item_sink: F,
) -> Result<(), StrategyError>
where
    S: Searcher + Sync,
    N: FnOnce(u64),
    F: FnMut(Finding<&'a [u8]>),
{
    let workers = workers.max(1);
    let subregions = partition(region, workers, delim);
    let mut batches: Vec<WorkerBatch<&'a [u8]>> =
        (0..subregions.len()).map(|_| WorkerBatch::new()).collect();

    thread::scope(|scope| {
        let mut pool = TaskPool::new(scope, workers);
        pool.run();
        for (&subregion, batch) in subregions.iter().zip(batches.iter_mut()) {
            pool.post(move || {
                for (line_idx, chunk) in RegionSplitter::new(subregion, delim).enumerate() {
                    batch.consume(tokenizer, line_idx as u64, &chunk);
                }
            });
        }
        pool.wait()
    })?;

    emit_rebased(batches, count_sink, item_sink);
    Ok(())
}
