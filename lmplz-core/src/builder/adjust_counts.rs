use std::cmp::Ordering;

use super::discount::Discount;
use super::enumerate_states::EnumerateStates;
use super::ngram::{common_suffix_len, suffix_cmp, WordIndex};
use super::stats::StatCollector;
use crate::error::{ConfigError, EstimateError, Result};
use crate::stream::{NGramReader, NGramWriter};

/// Pruning rule shared by every order: a threshold of 0 disables pruning,
/// otherwise counts at or below the threshold are dropped.
pub fn is_pruned(count: u64, threshold: u64) -> bool {
	threshold != 0 && count <= threshold
}

/// Computes Kneser-Ney adjusted counts.
///
/// Input: unique, suffix sorted N-grams with raw counts.
/// Output: 1..N-grams where orders below N carry adjusted (continuation)
/// counts, the number of distinct surviving one-word left extensions. Orders
/// below N stay in suffix order; N-grams keep their input order and must be
/// re-sorted by the caller.
///
/// # Responsibilities
/// - Derive every lower order in the same pass over the N-grams
/// - Prune each order against its threshold as soon as its count is final
/// - Tally count-of-counts and estimate discounts once the pass is done
///
/// The thresholds are not validated here beyond their length; see
/// [`crate::config::CountThresholds`].
#[derive(Clone, Copy, Debug)]
pub struct AdjustCounts<'a> {
	thresholds: &'a [u64],
}

/// Result of the adjustment pass before discount estimation.
#[derive(Debug)]
pub struct Adjusted {
	/// One finished stream per order, unigrams first.
	pub streams: Vec<NGramReader>,
	pub stats: StatCollector,
}

/// Everything the interpolation stage needs.
#[derive(Debug)]
pub struct AdjustOutput {
	/// CountsVector: n-grams seen per order.
	pub counts: Vec<u64>,
	/// CountsPrunedVector: n-grams kept per order.
	pub counts_pruned: Vec<u64>,
	pub discounts: Vec<Discount>,
	pub stats: StatCollector,
	/// One finished stream per order, unigrams first.
	pub streams: Vec<NGramReader>,
}

impl Adjusted {
	/// Estimates the discounts of every order. On failure the streams are
	/// dropped along with their temporary files.
	pub fn into_output(self) -> Result<AdjustOutput> {
		let discounts = self.stats.calculate_discounts()?;
		Ok(AdjustOutput {
			counts: self.stats.counts(),
			counts_pruned: self.stats.counts_pruned(),
			discounts,
			stats: self.stats,
			streams: self.streams,
		})
	}
}

impl<'a> AdjustCounts<'a> {
	/// `thresholds[k - 1]` is the pruning threshold of order `k`.
	pub fn new(thresholds: &'a [u64]) -> Self {
		Self { thresholds }
	}

	/// Runs the adjustment pass then estimates the discounts.
	///
	/// `outputs` holds one writer per order, unigrams first; the engine owns
	/// them for the duration of the call and hands them back as finished
	/// streams. `states`, when given, sees every lower-order n-gram that
	/// survives pruning.
	///
	/// # Errors
	/// - [`EstimateError::Configuration`] if the thresholds or outputs do not
	///   match the input order (checked before reading anything)
	/// - [`EstimateError::UnsortedInput`] if the input breaks suffix order
	/// - [`EstimateError::BadDiscount`] if any order cannot be discounted
	/// - I/O and resource errors from the streams
	pub fn run(
		&self,
		full: NGramReader,
		outputs: Vec<NGramWriter>,
		states: Option<&mut dyn EnumerateStates>,
	) -> Result<AdjustOutput> {
		self.adjust(full, outputs, states)?.into_output()
	}

	/// The adjustment pass alone: adjusted counts, pruning and statistics,
	/// without discount estimation.
	pub fn adjust(
		&self,
		mut full: NGramReader,
		mut outputs: Vec<NGramWriter>,
		mut states: Option<&mut dyn EnumerateStates>,
	) -> Result<Adjusted> {
		let order = full.order();
		self.check_layout(order, &outputs)?;
		log::info!("Adjusting counts of {}-grams", order);

		// Checked non-empty above
		let Some(mut full_out) = outputs.pop() else {
			return Err(ConfigError::InvalidOrder.into());
		};
		let full_threshold = self.thresholds[order - 1];
		let mut runs = SuffixRuns::new(self.thresholds, outputs);
		let mut previous: Vec<WordIndex> = Vec::with_capacity(order);

		while let Some((words, count)) = full.peek() {
			let same = if previous.is_empty() {
				0
			} else {
				if suffix_cmp(words, &previous) != Ordering::Greater {
					return Err(EstimateError::UnsortedInput { position: full.position() });
				}
				common_suffix_len(words, &previous)
			};

			// Suffixes longer than `same` changed: their runs are complete.
			runs.close_from(same + 1, &mut states)?;
			runs.open(words, same + 1)?;

			let pruned = is_pruned(count, full_threshold);
			runs.stats.add(order - 1, count, pruned);
			if !pruned {
				full_out.push(words, count)?;
				runs.extend(order - 1);
			}

			previous.clear();
			previous.extend_from_slice(words);
			full.advance()?;
		}
		runs.close_from(1, &mut states)?;

		let (lower, stats) = runs.into_parts();
		let mut streams = Vec::with_capacity(order);
		for writer in lower {
			streams.push(writer.finish()?);
		}
		streams.push(full_out.finish()?);

		for (i, stat) in stats.iter().enumerate() {
			log::info!("{}-grams: {} seen, {} kept", i + 1, stat.count, stat.count_pruned);
		}
		Ok(Adjusted { streams, stats })
	}

	fn check_layout(&self, order: usize, outputs: &[NGramWriter]) -> Result<()> {
		if order == 0 {
			return Err(ConfigError::InvalidOrder.into());
		}
		if self.thresholds.len() != order {
			return Err(ConfigError::ThresholdLength { expected: order, actual: self.thresholds.len() }.into());
		}
		if outputs.len() != order {
			return Err(ConfigError::OutputCount { expected: order, actual: outputs.len() }.into());
		}
		for (i, writer) in outputs.iter().enumerate() {
			if writer.order() != i + 1 {
				return Err(ConfigError::OutputOrder { expected: i + 1, actual: writer.order() }.into());
			}
		}
		Ok(())
	}
}

/// State slots of orders `1..N`: the open record of each lower-order writer
/// is the current suffix, `adjusted` counts its surviving left extensions.
///
/// # Invariants
/// - If order `k` has an open record, every order below `k` has one too and
///   it is the suffix of order `k`'s record.
struct SuffixRuns<'a> {
	thresholds: &'a [u64],
	lower: Vec<NGramWriter>,
	adjusted: Vec<u64>,
	stats: StatCollector,
}

impl<'a> SuffixRuns<'a> {
	fn new(thresholds: &'a [u64], lower: Vec<NGramWriter>) -> Self {
		Self {
			thresholds,
			adjusted: vec![0; lower.len()],
			stats: StatCollector::new(thresholds.len()),
			lower,
		}
	}

	/// Counts one more surviving extension of the open record of `order`.
	fn extend(&mut self, order: usize) {
		if order > 0 {
			self.adjusted[order - 1] += 1;
		}
	}

	/// Finalizes open records of orders `lowest..N`, highest first, so that
	/// a kept k-gram is credited to its (k-1)-suffix before that one closes.
	fn close_from(&mut self, lowest: usize, states: &mut Option<&mut dyn EnumerateStates>) -> Result<()> {
		for order in (lowest..=self.lower.len()).rev() {
			let writer = &mut self.lower[order - 1];
			if writer.current().is_none() {
				continue;
			}

			let adjusted = self.adjusted[order - 1];
			let pruned = is_pruned(adjusted, self.thresholds[order - 1]);
			self.stats.add(order - 1, adjusted, pruned);

			writer.set_count(adjusted);
			if pruned {
				writer.discard();
				continue;
			}
			if let (Some(sink), Some(words)) = (states.as_deref_mut(), writer.current()) {
				sink.add(words);
			}
			writer.commit();
			self.extend(order - 1);
		}
		Ok(())
	}

	/// Opens records of orders `lowest..N` with the suffixes of `words`.
	fn open(&mut self, words: &[WordIndex], lowest: usize) -> Result<()> {
		for order in lowest..=self.lower.len() {
			self.lower[order - 1].begin(&words[words.len() - order..])?;
			self.adjusted[order - 1] = 0;
		}
		Ok(())
	}

	fn into_parts(self) -> (Vec<NGramWriter>, StatCollector) {
		(self.lower, self.stats)
	}
}
