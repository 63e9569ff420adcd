//! First-occurrence substring searchers.
//!
//! All searchers share one interface: given a haystack, return the first
//! window that matches the pattern as a half-open byte range. A miss is the
//! empty range positioned at the end of the haystack, which lets the
//! tokenizer distinguish "match at end" from "no match" without an
//! `Option` in the hot loop.
//!
//! Five implementations:
//!
//! - [`NaiveSearcher`]: position-by-position scan under a [`ByteCompare`].
//!   O(n*m) worst case; the reference implementation the others are tested
//!   against.
//! - [`BoyerMooreSearcher`]: exact-equality Boyer-Moore with the
//!   bad-character heuristic (256-entry last-occurrence table).
//! - [`MaskedBoyerMooreSearcher`]: Boyer-Moore skeleton under an arbitrary
//!   comparator. The exact-equality table is unsound once `?` accepts
//!   every byte, so the shift falls back to scanning earlier pattern
//!   positions for one that accepts the mismatched source byte.
//! - [`MaskedTableSearcher`]: the same skeleton with the comparator baked
//!   into a per-byte shift table at construction time.
//! - [`MemmemSearcher`]: delegation to `memchr::memmem`, the SIMD-backed
//!   substring finder. Behaviorally identical to [`BoyerMooreSearcher`];
//!   the driver prefers it for wildcard-free patterns.

use std::ops::Range;

use memchr::memmem;

use crate::pattern::{ByteCompare, Exact, Masked, Pattern};

/// Locates the first pattern occurrence in a byte range.
pub trait Searcher {
    /// Returns the first match as a half-open range, with
    /// `range.len() == pattern.len()`. When there is no match the returned
    /// range is empty and positioned at `hay.len()`.
    fn find(&self, hay: &[u8]) -> Range<usize>;
}

impl<S: Searcher + ?Sized> Searcher for Box<S> {
    #[inline]
    fn find(&self, hay: &[u8]) -> Range<usize> {
        (**self).find(hay)
    }
}

impl<S: Searcher + ?Sized> Searcher for &S {
    #[inline]
    fn find(&self, hay: &[u8]) -> Range<usize> {
        (**self).find(hay)
    }
}

#[inline(always)]
fn miss(hay: &[u8]) -> Range<usize> {
    hay.len()..hay.len()
}

// ============================================================================
// Naive
// ============================================================================

/// Linear scan under a byte comparator.
#[derive(Clone, Debug)]
pub struct NaiveSearcher<C = Exact> {
    pattern: Box<[u8]>,
    cmp: C,
}

impl NaiveSearcher<Exact> {
    pub fn new(pattern: &Pattern) -> Self {
        Self::with_compare(pattern, Exact)
    }
}

impl NaiveSearcher<Masked> {
    pub fn masked(pattern: &Pattern) -> Self {
        Self::with_compare(pattern, Masked)
    }
}

impl<C: ByteCompare> NaiveSearcher<C> {
    pub fn with_compare(pattern: &Pattern, cmp: C) -> Self {
        Self {
            pattern: pattern.as_bytes().into(),
            cmp,
        }
    }
}

impl<C: ByteCompare> Searcher for NaiveSearcher<C> {
    fn find(&self, hay: &[u8]) -> Range<usize> {
        let m = self.pattern.len();
        if m > hay.len() {
            return miss(hay);
        }
        for pos in 0..=hay.len() - m {
            let window = &hay[pos..pos + m];
            if window
                .iter()
                .zip(self.pattern.iter())
                .all(|(&s, &p)| self.cmp.eq(s, p))
            {
                return pos..pos + m;
            }
        }
        miss(hay)
    }
}

// ============================================================================
// Boyer-Moore, exact equality
// ============================================================================

/// Boyer-Moore with the bad-character heuristic.
///
/// `last[c]` holds the last index of byte `c` in the pattern, or -1. On a
/// mismatch of source byte `c` at pattern index `k` the window advances by
/// `max(1, k - last[c])`: far enough to align the rightmost pattern
/// occurrence of `c` under the mismatch, or past it entirely.
#[derive(Clone, Debug)]
pub struct BoyerMooreSearcher {
    pattern: Box<[u8]>,
    last: [i32; 256],
}

impl BoyerMooreSearcher {
    pub fn new(pattern: &Pattern) -> Self {
        let mut last = [-1i32; 256];
        for (i, &byte) in pattern.as_bytes().iter().enumerate() {
            last[byte as usize] = i as i32;
        }
        Self {
            pattern: pattern.as_bytes().into(),
            last,
        }
    }
}

impl Searcher for BoyerMooreSearcher {
    fn find(&self, hay: &[u8]) -> Range<usize> {
        let pat = &self.pattern[..];
        let m = pat.len();
        if m > hay.len() {
            return miss(hay);
        }

        let mut pos = 0usize;
        while pos + m <= hay.len() {
            let window = &hay[pos..pos + m];
            // Compare right to left; k ends as the highest mismatching index.
            let mut k = m;
            while k > 0 && window[k - 1] == pat[k - 1] {
                k -= 1;
            }
            if k == 0 {
                return pos..pos + m;
            }
            let k = k - 1;
            let bad = window[k];
            let shift = (k as i32 - self.last[bad as usize]).max(1);
            pos += shift as usize;
        }
        miss(hay)
    }
}

// ============================================================================
// Boyer-Moore under a comparator (wildcard-capable)
// ============================================================================

/// Boyer-Moore skeleton generalized over a [`ByteCompare`].
///
/// The bad-character table assumes direct equality; under a predicate where
/// `?` accepts every byte it would compute unsound shifts. Instead, on a
/// mismatch at pattern index `k` this scans pattern positions `k-1, k-2,
/// ...` for the first one whose comparator accepts the mismatched source
/// byte and shifts by the distance between the two positions; if none
/// accepts, the window moves past the mismatch byte (`k + 1`). Worst case
/// O(n*m), but matches the tabled variant's behavior whenever the pattern
/// has no wildcard.
#[derive(Clone, Debug)]
pub struct MaskedBoyerMooreSearcher<C = Masked> {
    pattern: Box<[u8]>,
    cmp: C,
}

impl MaskedBoyerMooreSearcher<Masked> {
    pub fn new(pattern: &Pattern) -> Self {
        Self::with_compare(pattern, Masked)
    }
}

impl<C: ByteCompare> MaskedBoyerMooreSearcher<C> {
    pub fn with_compare(pattern: &Pattern, cmp: C) -> Self {
        Self {
            pattern: pattern.as_bytes().into(),
            cmp,
        }
    }
}

impl<C: ByteCompare> Searcher for MaskedBoyerMooreSearcher<C> {
    fn find(&self, hay: &[u8]) -> Range<usize> {
        let pat = &self.pattern[..];
        let m = pat.len();
        if m > hay.len() {
            return miss(hay);
        }

        let mut pos = 0usize;
        while pos + m <= hay.len() {
            let window = &hay[pos..pos + m];
            let mut k = m;
            while k > 0 && self.cmp.eq(window[k - 1], pat[k - 1]) {
                k -= 1;
            }
            if k == 0 {
                return pos..pos + m;
            }
            let k = k - 1;
            let bad = window[k];
            // Find the nearest earlier pattern position that accepts the
            // mismatched byte; align it under the mismatch.
            let shift = match (0..k).rev().find(|&i| self.cmp.eq(bad, pat[i])) {
                Some(i) => k - i,
                None => k + 1,
            };
            pos += shift;
        }
        miss(hay)
    }
}

// ============================================================================
// Boyer-Moore under a comparator, precomputed shift table
// ============================================================================

/// Comparator-aware Boyer-Moore with a precomputed per-byte shift table.
///
/// `last_accept[b]` holds the rightmost pattern index whose comparator
/// accepts source byte `b`, or -1. On a mismatch of `b` at pattern index
/// `k` the window advances by `max(1, k - last_accept[b])`: any smaller
/// shift would align `b` against a pattern position right of
/// `last_accept[b]`, which by construction rejects it.
///
/// Same contract as [`MaskedBoyerMooreSearcher`] with O(1) shifts instead
/// of the per-mismatch fallback scan; the trade is a 256-entry table built
/// once per pattern. With a wildcard in the pattern every entry is at
/// least the wildcard's index, so shifts shrink as the wildcard moves
/// right; without one this degenerates to the exact bad-character table.
#[derive(Clone, Debug)]
pub struct MaskedTableSearcher<C = Masked> {
    pattern: Box<[u8]>,
    last_accept: [i32; 256],
    cmp: C,
}

impl MaskedTableSearcher<Masked> {
    pub fn new(pattern: &Pattern) -> Self {
        Self::with_compare(pattern, Masked)
    }
}

impl<C: ByteCompare> MaskedTableSearcher<C> {
    pub fn with_compare(pattern: &Pattern, cmp: C) -> Self {
        let mut last_accept = [-1i32; 256];
        for (i, &pat) in pattern.as_bytes().iter().enumerate() {
            for (b, slot) in last_accept.iter_mut().enumerate() {
                if cmp.eq(b as u8, pat) {
                    *slot = i as i32;
                }
            }
        }
        Self {
            pattern: pattern.as_bytes().into(),
            last_accept,
            cmp,
        }
    }
}

impl<C: ByteCompare> Searcher for MaskedTableSearcher<C> {
    fn find(&self, hay: &[u8]) -> Range<usize> {
        let pat = &self.pattern[..];
        let m = pat.len();
        if m > hay.len() {
            return miss(hay);
        }

        let mut pos = 0usize;
        while pos + m <= hay.len() {
            let window = &hay[pos..pos + m];
            let mut k = m;
            while k > 0 && self.cmp.eq(window[k - 1], pat[k - 1]) {
                k -= 1;
            }
            if k == 0 {
                return pos..pos + m;
            }
            let k = k - 1;
            let bad = window[k];
            let shift = (k as i32 - self.last_accept[bad as usize]).max(1);
            pos += shift as usize;
        }
        miss(hay)
    }
}

// ============================================================================
// Library-delegated
// ============================================================================

/// Substring search delegated to `memchr::memmem`.
///
/// Same contract as [`BoyerMooreSearcher`]; exact patterns only.
#[derive(Clone, Debug)]
pub struct MemmemSearcher {
    finder: memmem::Finder<'static>,
    len: usize,
}

impl MemmemSearcher {
    pub fn new(pattern: &Pattern) -> Self {
        Self {
            finder: memmem::Finder::new(pattern.as_bytes()).into_owned(),
            len: pattern.len(),
        }
    }
}

impl Searcher for MemmemSearcher {
    #[inline]
    fn find(&self, hay: &[u8]) -> Range<usize> {
        match self.finder.find(hay) {
            Some(start) => start..start + self.len,
            None => miss(hay),
        }
    }
}
