//! Finding records, per-worker batches, and the two merge phases.
//!
//! Workers never share mutable state: each owns a [`WorkerBatch`] that it
//! fills in source order, and a single thread merges the batches after the
//! workers are joined. The two strategies differ only in how line numbers
//! are reconstructed:
//!
//! - Divide-and-conquer numbers lines worker-locally (each subregion starts
//!   at line 1) and the merge rebases them by the running count of lines
//!   the preceding subregions consumed.
//! - Round-robin numbers lines globally at dispatch time; each batch is
//!   individually sorted, and the merge interleaves the batches by
//!   repeatedly taking the smallest head line.
//!
//! Both merges emit the total count exactly once, before the first item.
//!
//! Finding text is generic: borrowed slices for mapped regions (the merge
//! never copies them), owned vectors for stream chunks whose backing line
//! is gone by merge time.

use std::ops::Range;

use crate::search::Searcher;
use crate::tokenize::Tokenizer;

/// A located match: 1-based line, 1-based byte column, matched bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding<T> {
    pub line: u64,
    pub column: u64,
    pub text: T,
}

/// A line's worth of bytes handed to a worker, borrowed or owned.
///
/// `extract` materializes finding text: borrowed chunks hand out subslices
/// (zero-copy for the life of the source region), owned chunks copy the
/// matched bytes out before the line is dropped.
pub trait LineChunk {
    type Text;

    fn as_bytes(&self) -> &[u8];
    fn extract(&self, range: Range<usize>) -> Self::Text;

    #[inline]
    fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl<'a> LineChunk for &'a [u8] {
    type Text = &'a [u8];

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self
    }

    #[inline]
    fn extract(&self, range: Range<usize>) -> &'a [u8] {
        &self[range]
    }
}

impl LineChunk for Vec<u8> {
    type Text = Vec<u8>;

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self
    }

    #[inline]
    fn extract(&self, range: Range<usize>) -> Vec<u8> {
        self[range].to_vec()
    }
}

/// Findings collected by one worker, in ascending line order.
///
/// `lines_seen` counts every chunk the worker consumed (matches or not,
/// empty or not); the rebasing merge needs it to recover global line
/// numbers. A worker that never sees a chunk reports 0.
#[derive(Debug)]
pub struct WorkerBatch<T> {
    findings: Vec<Finding<T>>,
    lines_seen: u64,
}

impl<T> Default for WorkerBatch<T> {
    fn default() -> Self {
        Self {
            findings: Vec::new(),
            lines_seen: 0,
        }
    }
}

impl<T> WorkerBatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizes one chunk and records its findings.
    ///
    /// `line_idx` is 0-based (worker-local for divide-and-conquer, global
    /// for round-robin); stored findings are 1-based.
    pub fn consume<S, C>(&mut self, tokenizer: &Tokenizer<S>, line_idx: u64, chunk: &C)
    where
        S: Searcher,
        C: LineChunk<Text = T>,
    {
        tokenizer.tokenize(chunk.as_bytes(), |found| {
            self.findings.push(Finding {
                line: line_idx + 1,
                column: found.start as u64 + 1,
                text: chunk.extract(found),
            });
        });
        self.lines_seen = line_idx + 1;
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }

    #[cfg(test)]
    pub(crate) fn findings(&self) -> &[Finding<T>] {
        &self.findings
    }
}

/// Rebase-and-concatenate merge for divide-and-conquer.
///
/// Batches arrive in subregion order with worker-local line numbers; each
/// batch's lines are shifted by the number of lines all preceding
/// subregions consumed. Empty subregions contribute a zero shift.
pub fn emit_rebased<T>(
    batches: Vec<WorkerBatch<T>>,
    count_sink: impl FnOnce(u64),
    mut item_sink: impl FnMut(Finding<T>),
) {
    let total: u64 = batches.iter().map(|b| b.len() as u64).sum();
    count_sink(total);

    let mut line_offset = 0u64;
    for batch in batches {
        let lines_seen = batch.lines_seen;
        for mut finding in batch.findings {
            finding.line += line_offset;
            item_sink(finding);
        }
        line_offset += lines_seen;
    }
}

/// K-way merge for round-robin.
///
/// Round-robin dispatch preserves per-worker ascending line order, and a
/// line is handled by exactly one worker, so repeatedly emitting the batch
/// with the smallest head line reconstructs the global order. Exhausted
/// batches are swap-removed from the active set.
pub fn emit_merged<T>(
    batches: Vec<WorkerBatch<T>>,
    count_sink: impl FnOnce(u64),
    mut item_sink: impl FnMut(Finding<T>),
) {
    let total: u64 = batches.iter().map(|b| b.len() as u64).sum();
    count_sink(total);

    struct Cursor<T> {
        head: Finding<T>,
        rest: std::vec::IntoIter<Finding<T>>,
    }

    let mut cursors: Vec<Cursor<T>> = batches
        .into_iter()
        .filter_map(|batch| {
            let mut rest = batch.findings.into_iter();
            rest.next().map(|head| Cursor { head, rest })
        })
        .collect();

    while !cursors.is_empty() {
        let mut min = 0;
        for i in 1..cursors.len() {
            if cursors[i].head.line < cursors[min].head.line {
                min = i;
            }
        }
        match cursors[min].rest.next() {
            Some(next) => {
                let done = std::mem::replace(&mut cursors[min].head, next);
                item_sink(done);
            }
            None => {
                let cursor = cursors.swap_remove(min);
                item_sink(cursor.head);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::search::BoyerMooreSearcher;

    fn tokenizer(needle: &[u8]) -> Tokenizer<BoyerMooreSearcher> {
        Tokenizer::new(BoyerMooreSearcher::new(&Pattern::parse(needle).unwrap()))
    }

    fn owned(line: u64, column: u64, text: &[u8]) -> Finding<Vec<u8>> {
        Finding {
            line,
            column,
            text: text.to_vec(),
        }
    }

    #[test]
    fn batch_consume_records_one_based_positions() {
        let tok = tokenizer(b"ab");
        let mut batch = WorkerBatch::new();
        batch.consume(&tok, 0, &&b"abxab"[..]);
        assert_eq!(
            batch.findings(),
            &[
                Finding {
                    line: 1,
                    column: 1,
                    text: &b"ab"[..]
                },
                Finding {
                    line: 1,
                    column: 4,
                    text: &b"ab"[..]
                },
            ]
        );
        assert_eq!(batch.lines_seen(), 1);
    }

    #[test]
    fn batch_counts_barren_lines() {
        let tok = tokenizer(b"zz");
        let mut batch: WorkerBatch<&[u8]> = WorkerBatch::new();
        batch.consume(&tok, 0, &&b"nothing"[..]);
        batch.consume(&tok, 1, &&b""[..]);
        batch.consume(&tok, 2, &&b"zz"[..]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.lines_seen(), 3);
    }

    #[test]
    fn rebased_merge_shifts_by_lines_seen() {
        let tok = tokenizer(b"x");

        // Worker 0 saw 3 lines, hit on line 2; worker 1 saw none;
        // worker 2 saw 2 lines, hit on its line 1.
        let mut b0 = WorkerBatch::new();
        b0.consume(&tok, 0, &b"-".to_vec());
        b0.consume(&tok, 1, &b"x".to_vec());
        b0.consume(&tok, 2, &b"-".to_vec());
        let b1: WorkerBatch<Vec<u8>> = WorkerBatch::new();
        let mut b2 = WorkerBatch::new();
        b2.consume(&tok, 0, &b"x".to_vec());
        b2.consume(&tok, 1, &b"-".to_vec());

        let mut total = None;
        let mut items = Vec::new();
        emit_rebased(vec![b0, b1, b2], |n| total = Some(n), |f| items.push(f));

        assert_eq!(total, Some(2));
        assert_eq!(items, vec![owned(2, 1, b"x"), owned(4, 1, b"x")]);
    }

    #[test]
    fn interleaved_merge_restores_global_order() {
        let tok = tokenizer(b"x");

        // Global lines 1..=5 dealt round-robin to two workers.
        let mut b0 = WorkerBatch::new();
        b0.consume(&tok, 0, &b"x".to_vec());
        b0.consume(&tok, 2, &b"xx".to_vec());
        b0.consume(&tok, 4, &b"x".to_vec());
        let mut b1 = WorkerBatch::new();
        b1.consume(&tok, 1, &b"x".to_vec());
        b1.consume(&tok, 3, &b"x".to_vec());

        let mut total = None;
        let mut items = Vec::new();
        emit_merged(vec![b0, b1], |n| total = Some(n), |f| items.push(f));

        assert_eq!(total, Some(6));
        let positions: Vec<(u64, u64)> = items.iter().map(|f| (f.line, f.column)).collect();
        assert_eq!(
            positions,
            vec![(1, 1), (2, 1), (3, 1), (3, 2), (4, 1), (5, 1)]
        );
    }

    #[test]
    fn merges_emit_count_before_items() {
        let tok = tokenizer(b"x");
        let mut batch = WorkerBatch::new();
        batch.consume(&tok, 0, &b"x".to_vec());

        let order = std::cell::RefCell::new(Vec::new());
        emit_rebased(
            vec![batch],
            |_| order.borrow_mut().push("count"),
            |_| order.borrow_mut().push("item"),
        );
        assert_eq!(order.into_inner(), vec!["count", "item"]);
    }

    #[test]
    fn empty_batches_emit_zero_total() {
        let mut total = None;
        let mut called = false;
        emit_merged(
            Vec::<WorkerBatch<Vec<u8>>>::new(),
            |n| total = Some(n),
            |_: Finding<Vec<u8>>| called = true,
        );
        assert_eq!(total, Some(0));
        assert!(!called);
    }
}
