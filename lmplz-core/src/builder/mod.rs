//! Count adjustment and discount estimation for modified Kneser-Ney.
//!
//! This module contains:
//! - N-gram records and suffix ordering (`ngram`)
//! - The single-pass adjustment engine with pruning (`adjust_counts`)
//! - Count-of-counts statistics (`stats`) and discounts (`discount`)
//! - A hook to observe surviving states (`enumerate_states`)
//! - The configured pipeline and a small corpus counter

/// Word indices, owned n-grams and suffix ordering.
pub mod ngram;

/// Single-pass computation of adjusted counts.
///
/// Derives orders 1..N-1 from the suffix sorted N-grams, prunes every
/// order and fills the count-of-counts statistics.
pub mod adjust_counts;

/// Per-order count-of-counts histograms.
pub mod stats;

/// Modified Kneser-Ney discount estimation.
pub mod discount;

/// Observer trait for the states kept by the adjustment pass.
pub mod enumerate_states;

/// In-memory counting of indexed sentences into suffix sorted N-grams.
pub mod corpus_count;

/// Configured estimation stage and its serializable summary.
pub mod pipeline;
