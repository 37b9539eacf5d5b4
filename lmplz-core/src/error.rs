//! Error types for count adjustment and discount estimation.
//!
//! Every failure aborts the whole pass: the caller drops any partial output
//! and restarts the stage with different parameters.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Top-level error returned by the pipeline and the adjustment engine.
#[derive(Error, Debug)]
pub enum EstimateError {
	/// Malformed configuration, detected before any stream is read.
	#[error("Invalid configuration: {0}")]
	Configuration(#[from] ConfigError),

	/// Count-of-counts statistics cannot produce valid Kneser-Ney discounts.
	#[error("Could not calculate Kneser-Ney discounts for {order}-grams: {problem}")]
	BadDiscount {
		/// Order (1-based) whose histogram is degenerate
		order: usize,
		/// What exactly went wrong
		problem: DiscountProblem,
	},

	/// The memory budget or temporary storage is too small for the job.
	#[error("Resource exhausted: {what} (needed {requested} bytes, have {available}). {remedy}")]
	ResourceExhaustion {
		/// Which resource ran out
		what: String,
		/// Bytes needed
		requested: u64,
		/// Bytes available
		available: u64,
		/// What the user can change
		remedy: &'static str,
	},

	/// The order-N input is not strictly increasing in suffix order.
	#[error("Input n-grams are not unique and suffix sorted at record {position}")]
	UnsortedInput {
		/// Zero-based index of the offending record
		position: u64,
	},

	/// I/O failure on a temporary block file.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// A block could not be encoded or decoded.
	#[error("Block encoding error: {0}")]
	Encoding(#[from] postcard::Error),
}

impl EstimateError {
	/// Creates a resource exhaustion error for a memory plan whose blocks
	/// are too small.
	pub fn resource_exhaustion<S: Into<String>>(what: S, requested: u64, available: u64) -> Self {
		Self::ResourceExhaustion {
			what: what.into(),
			requested,
			available,
			remedy: "Try a smaller block count or a larger memory budget",
		}
	}

	/// Creates a bad discount error for a 1-based `order`.
	pub fn bad_discount(order: usize, problem: DiscountProblem) -> Self {
		Self::BadDiscount { order, problem }
	}

	/// Maps an I/O error on temporary storage, turning "disk full" into
	/// [`EstimateError::ResourceExhaustion`].
	pub(crate) fn from_temp_io(err: std::io::Error, requested: u64) -> Self {
		if err.kind() == std::io::ErrorKind::StorageFull {
			Self::ResourceExhaustion {
				what: "temporary storage is full".to_owned(),
				requested,
				available: 0,
				remedy: "Reduce the memory budget or increase temporary disk space",
			}
		} else {
			Self::Io(err)
		}
	}
}

/// Configuration mistakes, all raised before the pass starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	#[error("Order must be at least 1")]
	InvalidOrder,

	#[error("Incorrect use of pruning option: expected one threshold per order ({expected}), got {actual}")]
	ThresholdLength { expected: usize, actual: usize },

	#[error("Unigrams cannot be pruned, their threshold must be 0 (got {threshold})")]
	UnigramPruned { threshold: u64 },

	#[error("Pruning threshold for {order}-grams ({higher}) is lower than the threshold of the previous order ({lower})")]
	DecreasingThreshold { order: usize, lower: u64, higher: u64 },

	#[error("Pruning counts threshold has to be a non-negative number, got {value:?}")]
	InvalidThreshold { value: String },

	#[error("Invalid size {value:?}")]
	InvalidSize { value: String },

	#[error("Expected one output stream per order ({expected}), got {actual}")]
	OutputCount { expected: usize, actual: usize },

	#[error("Output stream {expected} holds {actual}-grams")]
	OutputOrder { expected: usize, actual: usize },

	#[error("Record of {actual} words written to a stream of {expected}-grams")]
	RecordOrder { expected: usize, actual: usize },

	#[error("Cannot resolve a percentage of physical memory on this platform")]
	MemoryPercentUnavailable,
}

/// Reason a set of discounts was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscountProblem {
	/// A count-of-counts bucket needed by the formula is empty.
	#[error("no n-grams were observed with adjusted count {adjusted_count}; is this small or artificial data?")]
	MissingCount { adjusted_count: u8 },

	/// A discount is negative, larger than its bucket or not a number.
	#[error("discount for adjusted count {bucket} is out of range: {value}")]
	OutOfRange { bucket: u8, value: f32 },

	/// A higher bucket discounts less than a lower one.
	#[error("discounts are not increasing: D{bucket} = {lower} exceeds the next discount {higher}")]
	NotMonotonic { bucket: u8, lower: f32, higher: f32 },
}
