//! In-memory n-gram counting for small corpora.
//!
//! Produces the input of the adjustment pass (unique, suffix sorted
//! N-grams) from sentences that are already mapped to word indices. Large
//! corpora go through an external sort instead.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use super::ngram::{suffix_cmp, NGram, WordIndex};
use crate::error::Result;
use crate::stream::NGramWriter;

/// Counts the order-`order` n-grams of `sentences`.
///
/// Sentences are split into chunks counted on separate threads (several per
/// CPU); partial counts are merged as they arrive. Sentences shorter than
/// `order` contribute nothing.
pub fn count_ngrams(sentences: &[Vec<WordIndex>], order: usize) -> HashMap<Vec<WordIndex>, u64> {
	if order == 0 || sentences.is_empty() {
		return HashMap::new();
	}

	let cpus = num_cpus::get();
	let factor = 4;
	let chunks = cpus * factor;
	let chunk_size = sentences.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	for chunk in sentences.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<Vec<WordIndex>> = chunk.to_vec();

		thread::spawn(move || {
			let mut partial: HashMap<Vec<WordIndex>, u64> = HashMap::new();
			for sentence in &chunk {
				for window in sentence.windows(order) {
					*partial.entry(window.to_vec()).or_insert(0) += 1;
				}
			}
			// The receiver outlives every sender
			let _ = tx.send(partial);
		});
	}
	drop(tx);

	let mut counts: HashMap<Vec<WordIndex>, u64> = HashMap::new();
	for partial in rx.iter() {
		for (ngram, count) in partial {
			*counts.entry(ngram).or_insert(0) += count;
		}
	}
	log::debug!("Counted {} unique {}-grams in {} sentences", counts.len(), order, sentences.len());
	counts
}

/// Turns counts into unique n-grams sorted in suffix order.
pub fn sort_suffix(counts: HashMap<Vec<WordIndex>, u64>) -> Vec<NGram> {
	let mut ngrams: Vec<NGram> = counts
		.into_iter()
		.map(|(words, count)| NGram::new(words, count))
		.collect();
	ngrams.sort_unstable_by(|a, b| suffix_cmp(&a.words, &b.words));
	ngrams
}

/// Writes n-grams to `writer` in the given order.
pub fn write_counts(ngrams: &[NGram], writer: &mut NGramWriter) -> Result<()> {
	for ngram in ngrams {
		writer.push(&ngram.words, ngram.count)?;
	}
	Ok(())
}
