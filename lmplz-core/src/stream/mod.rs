//! Disk-backed record streams.
//!
//! - `Block`: fixed-width records of one order, the unit of I/O
//! - `ChainWriter` / `ChainReader`: a temporary file of blocks, written once
//!   then read strictly forward
//! - `NGramReader` / `NGramWriter`: record-level cursors over a chain

/// Packed n-gram records.
pub mod block;

/// Temporary-file block storage.
pub mod chain;

/// Record cursors (read side and in-place write side).
pub mod ngram_stream;

pub use block::Block;
pub use chain::{ChainConfig, ChainReader, ChainWriter};
pub use ngram_stream::{NGramReader, NGramWriter};
