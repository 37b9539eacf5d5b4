use serde::{Deserialize, Serialize};

use crate::builder::ngram::{NGram, WordIndex};

/// Size in bytes of one packed record of the given order.
pub fn entry_size(order: usize) -> usize {
	order * size_of::<WordIndex>() + size_of::<u64>()
}

/// A batch of fixed-width n-gram records of a single order.
///
/// Words are packed back to back, `order` per record, with counts kept in a
/// parallel vector. This is the unit moved between memory and the temporary
/// block file of a chain.
///
/// # Invariants
/// - `words.len() == order * counts.len()`
/// - `counts.len() <= capacity` for blocks built by a writer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Block {
	order: usize,
	words: Vec<WordIndex>,
	counts: Vec<u64>,
}

impl Block {
	/// Creates an empty block with room for `capacity` records.
	pub fn with_capacity(order: usize, capacity: usize) -> Self {
		Self {
			order,
			words: Vec::with_capacity(order * capacity),
			counts: Vec::with_capacity(capacity),
		}
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Words of record `index`.
	pub fn words(&self, index: usize) -> &[WordIndex] {
		&self.words[index * self.order..(index + 1) * self.order]
	}

	/// Count of record `index`.
	pub fn count(&self, index: usize) -> u64 {
		self.counts[index]
	}

	/// Overwrites the count of record `index` in place.
	pub fn set_count(&mut self, index: usize, count: u64) {
		self.counts[index] = count;
	}

	/// Appends a record. `words` must hold exactly `order` words; writers
	/// check this before pushing.
	pub fn push(&mut self, words: &[WordIndex], count: u64) {
		debug_assert_eq!(words.len(), self.order, "record order does not match block order");
		self.words.extend_from_slice(words);
		self.counts.push(count);
	}

	/// Removes the last record.
	pub fn pop(&mut self) {
		if self.counts.pop().is_some() {
			self.words.truncate(self.counts.len() * self.order);
		}
	}

	pub fn clear(&mut self) {
		self.words.clear();
		self.counts.clear();
	}

	/// Iterates over `(words, count)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&[WordIndex], u64)> {
		// chunks_exact panics on 0; an order-0 block never holds records
		self.words
			.chunks_exact(self.order.max(1))
			.zip(self.counts.iter().copied())
	}

	/// Unpacks the block into owned n-grams.
	pub fn to_ngrams(&self) -> Vec<NGram> {
		self.iter()
			.map(|(words, count)| NGram::new(words.to_vec(), count))
			.collect()
	}
}
