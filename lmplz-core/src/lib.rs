//! Disk-backed estimation of modified Kneser-Ney n-gram statistics.
//!
//! This crate turns unique, suffix sorted N-gram counts into everything the
//! interpolation stage of a language model builder needs:
//! - Adjusted (continuation) counts for orders 1..N-1, in suffix order
//! - Per-order pruning against count thresholds
//! - Count-of-counts statistics and discounts (D1, D2, D3+) per order
//!
//! Records live in temporary files and move through memory one block at a
//! time, so the corpus size is bounded by disk, not by the memory budget.

/// Adjustment engine, discounts, statistics and the estimation pipeline.
pub mod builder;

/// Pipeline settings: thresholds, sizes and the memory plan.
pub mod config;

/// Error types.
pub mod error;

/// Disk-backed record streams.
pub mod stream;

/// I/O utilities (file loading, path helpers).
pub mod io;


pub use builder::adjust_counts::{AdjustCounts, AdjustOutput, Adjusted};
pub use builder::discount::Discount;
pub use builder::enumerate_states::EnumerateStates;
pub use builder::ngram::{NGram, WordIndex};
pub use builder::pipeline::{EstimateSummary, Pipeline};
pub use config::{CountThresholds, PipelineConfig};
pub use error::{ConfigError, DiscountProblem, EstimateError, Result};
