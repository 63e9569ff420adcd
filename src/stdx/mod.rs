//! Small concurrency building blocks with no domain knowledge.

pub mod spsc;
