//! Document concatenation.

pub mod merger;

pub use merger::{DocumentMerger, MergeOutcome, MergeStatistics};
