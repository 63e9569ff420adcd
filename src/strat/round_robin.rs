//! Round-robin dispatch over any chunk producer.
//!
//! The calling thread is the producer: it pulls chunks from the splitter
//! in source order, numbering every chunk (empty ones included, so line
//! numbers match the source), and deals non-empty chunks cyclically to
//! W-1 [`ChunkPipeline`] consumers. With W == 1 the producer handles
//! chunks inline and no threads are spawned.
//!
//! Because the dealing order is fixed and each pipeline preserves push
//! order, every consumer's batch ends up sorted by line; the k-way merge
//! in [`emit_merged`] reconstructs the global order.

use std::thread;

use crate::exec::{ChunkPipeline, CHUNK_QUEUE_CAPACITY};
use crate::findings::{emit_merged, Finding, LineChunk, WorkerBatch};
use crate::search::Searcher;
use crate::strat::StrategyError;
use crate::tokenize::Tokenizer;

/// Searches chunks pulled from `splitter` and emits ordered findings.
///
/// `splitter` may yield borrowed chunks (mapped region) or owned chunks
/// (stream); finding text follows suit via [`LineChunk`]. The count sink
/// receives the total exactly once, before any item. On a handler panic
/// neither sink is invoked.
pub fn round_robin<I, C, S, N, F>(
    splitter: I,
    tokenizer: &Tokenizer<S>,
    workers: usize,
    count_sink: N,
    item_sink: F,
) -> Result<(), StrategyError>
where
    I: Iterator<Item = C>,
    C: LineChunk + Send,
    C::Text: Send,
    S: Searcher + Sync,
    N: FnOnce(u64),
    F: FnMut(Finding<C::Text>),
{
    let workers = workers.max(1);

    if workers == 1 {
        let mut batch = WorkerBatch::new();
        for (line_idx, chunk) in splitter.enumerate() {
            if !chunk.is_empty() {
                batch.consume(tokenizer, line_idx as u64, &chunk);
            }
        }
        emit_merged(vec![batch], count_sink, item_sink);
        return Ok(());
    }

    let consumers = workers - 1;
    let mut batches: Vec<WorkerBatch<C::Text>> =
        (0..consumers).map(|_| WorkerBatch::new()).collect();

    thread::scope(|scope| {
        let mut pipelines: Vec<ChunkPipeline<'_, (u64, C)>> = batches
            .iter_mut()
            .map(|batch| {
                ChunkPipeline::start(scope, CHUNK_QUEUE_CAPACITY, move |(line_idx, chunk)| {
                    batch.consume(tokenizer, line_idx, &chunk);
                })
            })
            .collect();

        let mut target = 0usize;
        for (line_idx, chunk) in splitter.enumerate() {
            if chunk.is_empty() {
                continue;
            }
            pipelines[target].push((line_idx as u64, chunk));
            target = (target + 1) % consumers;
        }

        let mut panicked = false;
        for pipeline in pipelines {
            if pipeline.stop().is_err() {
                panicked = true;
            }
        }
        if panicked {
            Err(StrategyError::WorkerPanicked)
        } else {
            Ok(())
        }
    })?;

    emit_merged(batches, count_sink, item_sink);
    Ok(())
}
