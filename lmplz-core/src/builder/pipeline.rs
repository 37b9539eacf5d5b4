use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::adjust_counts::{AdjustCounts, AdjustOutput};
use super::corpus_count::{count_ngrams, sort_suffix, write_counts};
use super::discount::Discount;
use super::enumerate_states::EnumerateStates;
use super::ngram::WordIndex;
use crate::config::{CountThresholds, PipelineConfig};
use crate::error::{ConfigError, Result};
use crate::io::sibling_path;
use crate::stream::{NGramReader, NGramWriter};

/// Estimation stage wired from a [`PipelineConfig`].
///
/// Owns the validated configuration and hands out chains sized by its
/// memory plan. Every run creates fresh temporary files; nothing is carried
/// over between runs.
#[derive(Debug)]
pub struct Pipeline {
	config: PipelineConfig,
	thresholds: CountThresholds,
}

impl Pipeline {
	/// Validates `config` (thresholds and memory plan) before any work.
	///
	/// # Errors
	/// [`crate::EstimateError::Configuration`] or
	/// [`crate::EstimateError::ResourceExhaustion`].
	pub fn new(config: PipelineConfig) -> Result<Self> {
		config.validate()?;
		let thresholds = config.thresholds()?;
		Ok(Self { config, thresholds })
	}

	pub fn config(&self) -> &PipelineConfig {
		&self.config
	}

	pub fn thresholds(&self) -> &CountThresholds {
		&self.thresholds
	}

	/// An empty output chain for records of `order`.
	pub fn writer(&self, order: usize) -> Result<NGramWriter> {
		NGramWriter::create(&self.config.temp_prefix, order, &self.config.chain_config(order)?)
	}

	/// Counts the N-grams of indexed sentences and returns them as a suffix
	/// sorted stream, ready for [`Pipeline::adjust_counts`].
	pub fn count_corpus(&self, sentences: &[Vec<WordIndex>]) -> Result<NGramReader> {
		let order = self.config.order;
		let ngrams = sort_suffix(count_ngrams(sentences, order));
		log::info!("Writing {} unique {}-grams", ngrams.len(), order);

		let mut writer = self.writer(order)?;
		write_counts(&ngrams, &mut writer)?;
		writer.finish()
	}

	/// Runs the adjustment pass and discount estimation on `full`.
	pub fn adjust_counts(
		&self,
		full: NGramReader,
		states: Option<&mut dyn EnumerateStates>,
	) -> Result<AdjustOutput> {
		if full.order() != self.config.order {
			return Err(ConfigError::OutputOrder { expected: self.config.order, actual: full.order() }.into());
		}
		let outputs = (1..=self.config.order)
			.map(|order| self.writer(order))
			.collect::<Result<Vec<_>>>()?;
		AdjustCounts::new(self.thresholds.as_slice()).run(full, outputs, states)
	}

	/// Counts `sentences` and adjusts the counts in one call.
	pub fn run(
		&self,
		sentences: &[Vec<WordIndex>],
		states: Option<&mut dyn EnumerateStates>,
	) -> Result<AdjustOutput> {
		let full = self.count_corpus(sentences)?;
		self.adjust_counts(full, states)
	}
}

/// Serializable digest of a finished run: per-order counts and discounts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EstimateSummary {
	pub order: usize,
	pub counts: Vec<u64>,
	pub counts_pruned: Vec<u64>,
	pub discounts: Vec<Discount>,
}

impl EstimateSummary {
	pub fn from_output(output: &AdjustOutput) -> Self {
		Self {
			order: output.counts.len(),
			counts: output.counts.clone(),
			counts_pruned: output.counts_pruned.clone(),
			discounts: output.discounts.clone(),
		}
	}

	/// Saves the summary next to `input_path`, as `<stem>.bin`, using
	/// `postcard`. Returns the written path.
	pub fn save<P: AsRef<Path>>(&self, input_path: P) -> Result<PathBuf> {
		let path = sibling_path(input_path, "bin")?;
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(&path, bytes)?;
		Ok(path)
	}

	/// Loads a summary written by [`EstimateSummary::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}
