use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Index of a word in the vocabulary.
pub type WordIndex = u32;

/// An owned n-gram with its count.
///
/// Streams store records packed in blocks; `NGram` is the unpacked form
/// handed to callers that collect a stream (tests, the demo, the corpus
/// counter).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NGram {
	pub words: Vec<WordIndex>,
	pub count: u64,
}

impl NGram {
	pub fn new(words: Vec<WordIndex>, count: u64) -> Self {
		Self { words, count }
	}

	/// Number of words.
	pub fn order(&self) -> usize {
		self.words.len()
	}
}

/// Compares two word sequences starting from the last word.
///
/// Records sharing a right context are contiguous under this order. When one
/// sequence is a suffix of the other, the shorter one sorts first.
pub fn suffix_cmp(a: &[WordIndex], b: &[WordIndex]) -> Ordering {
	a.iter()
		.rev()
		.cmp(b.iter().rev())
}

/// Number of trailing words shared by `a` and `b`.
pub fn common_suffix_len(a: &[WordIndex], b: &[WordIndex]) -> usize {
	a.iter()
		.rev()
		.zip(b.iter().rev())
		.take_while(|(x, y)| x == y)
		.count()
}
