use std::path::Path;

use crate::builder::ngram::{NGram, WordIndex};
use crate::error::{ConfigError, Result};
use super::block::Block;
use super::chain::{ChainConfig, ChainReader, ChainWriter};

/// Records preallocated per block; blocks grow up to their capacity on demand.
const INITIAL_RECORDS: usize = 1024;

/// Forward-only cursor over the records of one order.
///
/// Holds a single block in memory and pulls the next one from its chain
/// when the current block is exhausted.
#[derive(Debug)]
pub struct NGramReader {
	chain: ChainReader,
	block: Block,
	position: usize,
	records: u64,
}

impl NGramReader {
	/// Opens a cursor on the first record of `chain`.
	pub fn new(mut chain: ChainReader) -> Result<Self> {
		let mut block = Block::with_capacity(chain.order(), 0);
		chain.read_block(&mut block)?;
		Ok(Self { chain, block, position: 0, records: 0 })
	}

	pub fn order(&self) -> usize {
		self.chain.order()
	}

	/// `true` once every record has been consumed.
	pub fn is_end(&self) -> bool {
		self.position >= self.block.len()
	}

	/// Current record, or `None` at the end of the stream.
	pub fn peek(&self) -> Option<(&[WordIndex], u64)> {
		if self.is_end() {
			return None;
		}
		Some((self.block.words(self.position), self.block.count(self.position)))
	}

	/// Number of records consumed so far.
	pub fn position(&self) -> u64 {
		self.records
	}

	/// Moves to the next record, reading the next block when needed.
	/// Advancing at the end of the stream is a no-op.
	pub fn advance(&mut self) -> Result<()> {
		if self.is_end() {
			return Ok(());
		}
		self.position += 1;
		self.records += 1;
		// A chain never stores empty blocks, but skip them anyway.
		while self.position >= self.block.len() {
			if !self.chain.read_block(&mut self.block)? {
				break;
			}
			self.position = 0;
		}
		Ok(())
	}

	/// Drains the remaining records into owned n-grams.
	pub fn collect_ngrams(mut self) -> Result<Vec<NGram>> {
		let mut out = Vec::new();
		while let Some((words, count)) = self.peek() {
			out.push(NGram::new(words.to_vec(), count));
			self.advance()?;
		}
		Ok(out)
	}
}

/// Append-only output of one order.
///
/// Besides plain `push`, a writer keeps an optional *open* record at the tail
/// of its block: `begin` appends it with count 0, `set_count` overwrites its
/// count in place and `commit`/`discard` either keep or drop it. The block is
/// spilled to the chain only when a new record needs room, so the open
/// record is always in memory.
#[derive(Debug)]
pub struct NGramWriter {
	chain: ChainWriter,
	block: Block,
	capacity: usize,
	open: bool,
	written: u64,
}

impl NGramWriter {
	/// Creates a writer backed by a temporary file in `dir`.
	pub fn create<P: AsRef<Path>>(dir: P, order: usize, config: &ChainConfig) -> Result<Self> {
		let capacity = config.records_per_block()?;
		Ok(Self {
			chain: ChainWriter::create(dir, order, config)?,
			block: Block::with_capacity(order, capacity.min(INITIAL_RECORDS)),
			capacity,
			open: false,
			written: 0,
		})
	}

	pub fn order(&self) -> usize {
		self.block.order()
	}

	/// Records kept so far (the open record excluded).
	pub fn written(&self) -> u64 {
		self.written
	}

	/// Appends a finished record.
	///
	/// # Errors
	/// [`ConfigError::RecordOrder`] if `words` is not an n-gram of this
	/// writer's order; I/O errors when a full block is spilled.
	pub fn push(&mut self, words: &[WordIndex], count: u64) -> Result<()> {
		debug_assert!(!self.open, "push while a record is open");
		self.check_order(words)?;
		self.reserve()?;
		self.block.push(words, count);
		self.written += 1;
		Ok(())
	}

	/// Opens a record with count 0. Any previously open record must have
	/// been committed or discarded.
	pub fn begin(&mut self, words: &[WordIndex]) -> Result<()> {
		debug_assert!(!self.open, "begin while a record is open");
		self.check_order(words)?;
		self.reserve()?;
		self.block.push(words, 0);
		self.open = true;
		Ok(())
	}

	/// Words of the open record.
	pub fn current(&self) -> Option<&[WordIndex]> {
		if self.open {
			Some(self.block.words(self.block.len() - 1))
		} else {
			None
		}
	}

	/// Overwrites the count of the open record.
	pub fn set_count(&mut self, count: u64) {
		if self.open {
			let last = self.block.len() - 1;
			self.block.set_count(last, count);
		}
	}

	/// Keeps the open record.
	pub fn commit(&mut self) {
		if self.open {
			self.open = false;
			self.written += 1;
		}
	}

	/// Drops the open record.
	pub fn discard(&mut self) {
		if self.open {
			self.open = false;
			self.block.pop();
		}
	}

	/// Flushes the last block and turns the output into a cursor.
	/// An open record left behind is discarded.
	pub fn finish(mut self) -> Result<NGramReader> {
		self.discard();
		self.chain.write_block(&self.block)?;
		NGramReader::new(self.chain.into_reader()?)
	}

	fn check_order(&self, words: &[WordIndex]) -> Result<()> {
		if words.len() != self.order() {
			return Err(ConfigError::RecordOrder { expected: self.order(), actual: words.len() }.into());
		}
		Ok(())
	}

	fn reserve(&mut self) -> Result<()> {
		if self.block.len() >= self.capacity {
			self.chain.write_block(&self.block)?;
			self.block.clear();
		}
		Ok(())
	}
}
