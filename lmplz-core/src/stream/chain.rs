use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{EstimateError, Result};
use super::block::{entry_size, Block};

/// Upper bound on the file buffer of one chain.
const MAX_BUFFER: usize = 8 << 20;

/// Sizing of the blocks moved through one chain.
///
/// A chain owns `block_count` blocks of `block_size` bytes in memory at
/// most: one is filled (or consumed) by the cursor, the others buffer file
/// I/O. Everything else lives in its temporary file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
	/// Bytes per record
	pub entry_size: usize,
	/// Bytes per block
	pub block_size: usize,
	/// Blocks in flight for this chain
	pub block_count: usize,
}

impl ChainConfig {
	/// Creates a chain configuration for records of the given order.
	pub fn for_order(order: usize, block_size: usize, block_count: usize) -> Self {
		Self { entry_size: entry_size(order), block_size, block_count }
	}

	/// Number of whole records that fit in one block.
	///
	/// # Errors
	/// Returns [`EstimateError::ResourceExhaustion`] if a block cannot hold a
	/// single record.
	pub fn records_per_block(&self) -> Result<usize> {
		let records = self.block_size / self.entry_size;
		if records == 0 {
			return Err(EstimateError::resource_exhaustion(
				"block is smaller than one record",
				self.entry_size as u64,
				self.block_size as u64,
			));
		}
		Ok(records)
	}

	/// Bytes buffered between a cursor and the temporary file: every block
	/// but the one held by the cursor, at least one, capped at 8 MiB.
	pub fn buffer_size(&self) -> usize {
		self.block_size
			.saturating_mul(self.block_count.saturating_sub(1).max(1))
			.min(MAX_BUFFER)
	}
}

/// Write side of a chain: blocks are appended to an anonymous temporary file
/// as length-prefixed postcard frames.
#[derive(Debug)]
pub struct ChainWriter {
	file: BufWriter<File>,
	order: usize,
	buffer: usize,
	blocks: u64,
	bytes: u64,
}

impl ChainWriter {
	/// Creates a chain of `order` records backed by a fresh temporary file in
	/// `dir`, buffered as `config` allows.
	///
	/// The file is unlinked by the OS once the chain is dropped.
	pub fn create<P: AsRef<Path>>(dir: P, order: usize, config: &ChainConfig) -> Result<Self> {
		let file = tempfile::tempfile_in(dir).map_err(|e| EstimateError::from_temp_io(e, 0))?;
		let buffer = config.buffer_size();
		Ok(Self { file: BufWriter::with_capacity(buffer, file), order, buffer, blocks: 0, bytes: 0 })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of blocks written so far.
	pub fn blocks(&self) -> u64 {
		self.blocks
	}

	/// Appends a block. Empty blocks are skipped.
	pub fn write_block(&mut self, block: &Block) -> Result<()> {
		if block.is_empty() {
			return Ok(());
		}
		debug_assert_eq!(block.order(), self.order);

		let frame = postcard::to_stdvec(block)?;
		let length = frame.len() as u64;
		self.file
			.write_all(&length.to_le_bytes())
			.and_then(|_| self.file.write_all(&frame))
			.map_err(|e| EstimateError::from_temp_io(e, length))?;

		self.blocks += 1;
		self.bytes += length + 8;
		Ok(())
	}

	/// Flushes the file and rewinds it for reading.
	pub fn into_reader(self) -> Result<ChainReader> {
		let requested = self.bytes;
		let mut file = self
			.file
			.into_inner()
			.map_err(|e| EstimateError::from_temp_io(e.into_error(), requested))?;
		file.seek(SeekFrom::Start(0))?;
		log::debug!("Chain for {}-grams holds {} blocks ({} bytes)", self.order, self.blocks, self.bytes);

		Ok(ChainReader {
			file: BufReader::with_capacity(self.buffer, file),
			order: self.order,
			remaining: self.blocks,
			frame: Vec::new(),
		})
	}
}

/// Read side of a chain. Blocks come back strictly in write order.
#[derive(Debug)]
pub struct ChainReader {
	file: BufReader<File>,
	order: usize,
	remaining: u64,
	frame: Vec<u8>,
}

impl ChainReader {
	pub fn order(&self) -> usize {
		self.order
	}

	/// Blocks not read yet.
	pub fn remaining(&self) -> u64 {
		self.remaining
	}

	/// Reads the next block into `block`.
	///
	/// Returns `false` once the chain is exhausted, leaving `block` empty.
	pub fn read_block(&mut self, block: &mut Block) -> Result<bool> {
		if self.remaining == 0 {
			block.clear();
			return Ok(false);
		}

		let mut length = [0u8; 8];
		self.file.read_exact(&mut length)?;
		let length = usize::try_from(u64::from_le_bytes(length))
			.map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Block frame too large"))?;
		self.frame.resize(length, 0);
		self.file.read_exact(&mut self.frame)?;

		let decoded: Block = postcard::from_bytes(&self.frame)?;
		if decoded.order() != self.order {
			return Err(io::Error::new(io::ErrorKind::InvalidData, "Block order mismatch").into());
		}
		*block = decoded;
		self.remaining -= 1;
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blocks_come_back_in_order() {
		let dir = tempfile::tempdir().unwrap();
		let mut writer = ChainWriter::create(dir.path(), 2, &ChainConfig::for_order(2, 64, 2)).unwrap();
		for i in 0..3u32 {
			let mut block = Block::with_capacity(2, 2);
			block.push(&[i, i + 1], u64::from(i));
			block.push(&[i + 1, i], 1);
			writer.write_block(&block).unwrap();
		}
		writer.write_block(&Block::with_capacity(2, 2)).unwrap();
		assert_eq!(writer.blocks(), 3);

		let mut reader = writer.into_reader().unwrap();
		let mut block = Block::with_capacity(2, 2);
		let mut seen = Vec::new();
		while reader.read_block(&mut block).unwrap() {
			seen.push(block.words(0).to_vec());
		}
		assert_eq!(seen, vec![vec![0, 1], vec![1, 2], vec![2, 3]]);
		assert!(block.is_empty());
	}

	#[test]
	fn block_smaller_than_record_is_rejected() {
		let config = ChainConfig::for_order(5, 16, 2);
		assert!(matches!(
			config.records_per_block(),
			Err(EstimateError::ResourceExhaustion { requested: 28, available: 16, .. })
		));
		assert_eq!(ChainConfig::for_order(1, 36, 2).records_per_block().unwrap(), 3);
	}

	#[test]
	fn buffer_holds_the_other_blocks() {
		assert_eq!(ChainConfig::for_order(2, 4096, 3).buffer_size(), 8192);
		assert_eq!(ChainConfig::for_order(2, 4096, 1).buffer_size(), 4096);
		assert_eq!(ChainConfig::for_order(2, 4096, 0).buffer_size(), 4096);
		assert_eq!(ChainConfig::for_order(2, 1 << 30, 2).buffer_size(), MAX_BUFFER);
	}
}
