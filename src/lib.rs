//! Multithreaded wildcard pattern search over line-oriented input.
//!
//! The crate finds every occurrence of a fixed-length pattern (7-bit
//! symbols, `?` matches any single byte) in a delimiter-separated byte
//! source and reports `(line, column, match)` triples in global source
//! order, preceded by the total match count.
//!
//! # Architecture
//!
//! ```text
//!                       mapped file                    stream / stdin
//!                            │                               │
//!                            ▼                               ▼
//!                 strat::divide_and_conquer        strat::round_robin
//!                 (partition on delimiter          (producer deals chunks
//!                  boundaries, one pool             to W-1 SPSC-fed
//!                  task per subregion)              consumer threads)
//!                            │                               │
//!            RegionSplitter ─┤               StreamSplitter ─┤
//!            Tokenizer ──────┤               Tokenizer ──────┤
//!                            ▼                               ▼
//!                  per-worker WorkerBatch          per-worker WorkerBatch
//!                            │                               │
//!                            ▼                               ▼
//!                  findings::emit_rebased          findings::emit_merged
//!                      (offset rebase)                (k-way merge)
//!                            └───────────────┬───────────────┘
//!                                            ▼
//!                              count sink, then item sink
//! ```
//!
//! Leaves first: [`split`] produces lines lazily (zero-copy over regions,
//! owning over streams); [`search`] locates the first pattern occurrence
//! in a line (naive, Boyer-Moore, wildcard-generalized Boyer-Moore, or
//! `memmem`-delegated); [`tokenize`] turns first-occurrence search into
//! all non-overlapping matches; [`exec`] provides the two concurrent
//! runtimes (a scoped thread pool and a dedicated-consumer SPSC
//! pipeline); [`strat`] ties everything together and guarantees globally
//! ordered emission.
//!
//! Workers share only read-only state (the source region and the
//! pattern); each owns its findings batch until the single-threaded merge
//! phase. The only cross-thread mutable structure is the SPSC ring in
//! [`stdx::spsc`].

pub mod exec;
pub mod findings;
pub mod input;
pub mod pattern;
pub mod search;
pub mod sink;
pub mod split;
pub mod stdx;
pub mod strat;
pub mod tokenize;

pub use findings::Finding;
pub use pattern::{Pattern, PatternError};
pub use search::{
    BoyerMooreSearcher, MaskedBoyerMooreSearcher, MaskedTableSearcher, MemmemSearcher,
    NaiveSearcher, Searcher,
};
pub use split::{RegionSplitter, StreamSplitter};
pub use strat::{divide_and_conquer, round_robin, StrategyError};
pub use tokenize::Tokenizer;
