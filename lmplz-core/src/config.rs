use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EstimateError, Result};
use crate::io::normalize_folder;
use crate::stream::ChainConfig;

/// Validated pruning thresholds, one per order.
///
/// # Invariants
/// - one threshold per order
/// - the unigram threshold is 0 (unigrams are never pruned)
/// - thresholds never decrease with the order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CountThresholds(Vec<u64>);

impl CountThresholds {
	/// Validates `thresholds` for a model of the given order.
	///
	/// # Errors
	/// [`ConfigError::ThresholdLength`], [`ConfigError::UnigramPruned`] or
	/// [`ConfigError::DecreasingThreshold`].
	pub fn new(thresholds: Vec<u64>, order: usize) -> std::result::Result<Self, ConfigError> {
		validate_thresholds(&thresholds, order)?;
		Ok(Self(thresholds))
	}

	/// No pruning at any order.
	pub fn none(order: usize) -> Self {
		Self(vec![0; order])
	}

	pub fn as_slice(&self) -> &[u64] {
		&self.0
	}

	pub fn order(&self) -> usize {
		self.0.len()
	}
}

/// Checks a threshold vector against the model order.
pub fn validate_thresholds(thresholds: &[u64], order: usize) -> std::result::Result<(), ConfigError> {
	if order == 0 {
		return Err(ConfigError::InvalidOrder);
	}
	if thresholds.len() != order {
		return Err(ConfigError::ThresholdLength { expected: order, actual: thresholds.len() });
	}
	if thresholds[0] != 0 {
		return Err(ConfigError::UnigramPruned { threshold: thresholds[0] });
	}
	for (i, pair) in thresholds.windows(2).enumerate() {
		if pair[0] > pair[1] {
			return Err(ConfigError::DecreasingThreshold { order: i + 2, lower: pair[0], higher: pair[1] });
		}
	}
	Ok(())
}

/// Parses pruning thresholds such as `"0 5 100"` or `"0,5,100"`.
///
/// - Separators are commas and spaces; runs of separators count as one
/// - An empty parameter means no pruning (all zeros)
///
/// # Errors
/// [`ConfigError::InvalidThreshold`] for anything but non-negative
/// integers, then the checks of [`validate_thresholds`].
pub fn parse_pruning_parameter(param: &str, order: usize) -> std::result::Result<CountThresholds, ConfigError> {
	let thresholds = param
		.split([',', ' '])
		.filter(|token| !token.is_empty())
		.map(|token| {
			token
				.parse::<u64>()
				.map_err(|_| ConfigError::InvalidThreshold { value: token.to_owned() })
		})
		.collect::<std::result::Result<Vec<u64>, _>>()?;

	if thresholds.is_empty() {
		if order == 0 {
			return Err(ConfigError::InvalidOrder);
		}
		return Ok(CountThresholds::none(order));
	}
	CountThresholds::new(thresholds, order)
}

/// Parses a memory size the way GNU sort does.
///
/// A number followed by an optional unit: `%` of physical memory, `b` for
/// bytes, or `K M G T P E Z Y` for powers of 1024. Without a unit the number is
/// in KiB.
///
/// Examples: `"64M"` → 67108864, `"8K"` → 8192, `"100"` → 102400.
pub fn parse_size(text: &str) -> std::result::Result<u64, ConfigError> {
	let invalid = || ConfigError::InvalidSize { value: text.to_owned() };
	let text = text.trim();
	let split = text
		.find(|c: char| !(c.is_ascii_digit() || c == '.'))
		.unwrap_or(text.len());
	let (number, unit) = text.split_at(split);
	let number: f64 = number.parse().map_err(|_| invalid())?;

	if unit == "%" {
		let physical = guess_physical_memory().ok_or(ConfigError::MemoryPercentUnavailable)?;
		return Ok((physical as f64 * number / 100.0) as u64);
	}

	let power = match unit {
		"b" => 0,
		"" | "k" | "K" => 1,
		"m" | "M" => 2,
		"g" | "G" => 3,
		"t" | "T" => 4,
		"p" | "P" => 5,
		"e" | "E" => 6,
		"z" | "Z" => 7,
		"y" | "Y" => 8,
		_ => return Err(invalid()),
	};
	let bytes = number * 1024f64.powi(power);
	if !bytes.is_finite() || bytes >= u64::MAX as f64 {
		return Err(invalid());
	}
	Ok(bytes as u64)
}

/// Total physical memory in bytes, when the platform tells us.
pub fn guess_physical_memory() -> Option<u64> {
	let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
	meminfo
		.lines()
		.find_map(|line| line.strip_prefix("MemTotal:"))
		.and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse::<u64>().ok())
		.map(|kib| kib * 1024)
}

/// Settings of the estimation pipeline.
///
/// Memory is split evenly between the input chain and the N output chains;
/// each chain's share is divided into `block_count` blocks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
	/// Order of the model (N).
	pub order: usize,
	/// Directory for temporary block files.
	pub temp_prefix: PathBuf,
	/// Memory budget for all chains, in bytes.
	pub total_memory: u64,
	/// Blocks per chain.
	pub block_count: usize,
	/// Smallest block size allowed, in bytes.
	pub minimum_block: u64,
	/// Pruning threshold per order.
	pub counts_threshold: Vec<u64>,
}

impl PipelineConfig {
	/// Default settings for a model of the given order: 1 GiB of memory,
	/// 2 blocks per chain, 8 KiB minimum block, no pruning, OS temp dir.
	pub fn new(order: usize) -> Self {
		Self {
			order,
			temp_prefix: std::env::temp_dir(),
			total_memory: 1 << 30,
			block_count: 2,
			minimum_block: 8 << 10,
			counts_threshold: vec![0; order],
		}
	}

	/// Sets the temporary directory; `"."` and `"./"` mean the current
	/// directory.
	pub fn with_temp_prefix(mut self, temp_prefix: &str) -> Self {
		self.temp_prefix = normalize_folder(temp_prefix);
		self
	}

	/// Sets the memory budget from a GNU sort style size.
	pub fn with_memory(mut self, size: &str) -> std::result::Result<Self, ConfigError> {
		self.total_memory = parse_size(size)?;
		Ok(self)
	}

	/// Sets the pruning thresholds from a `-P` style parameter.
	pub fn with_pruning(mut self, param: &str) -> std::result::Result<Self, ConfigError> {
		self.counts_threshold = parse_pruning_parameter(param, self.order)?.0;
		Ok(self)
	}

	/// Validated thresholds.
	pub fn thresholds(&self) -> std::result::Result<CountThresholds, ConfigError> {
		CountThresholds::new(self.counts_threshold.clone(), self.order)
	}

	/// Bytes per block shared by every chain.
	///
	/// # Errors
	/// [`EstimateError::ResourceExhaustion`] if the budget leaves blocks
	/// smaller than `minimum_block`.
	pub fn block_size(&self) -> Result<u64> {
		if self.order == 0 {
			return Err(ConfigError::InvalidOrder.into());
		}
		if self.block_count == 0 {
			return Err(ConfigError::InvalidSize { value: "block_count = 0".to_owned() }.into());
		}
		let chains = self.order as u64 + 1;
		let block_size = self.total_memory / chains / self.block_count as u64;
		log::debug!(
			"Memory plan: {} bytes over {} chains of {} blocks, {} bytes per block",
			self.total_memory,
			chains,
			self.block_count,
			block_size
		);
		if block_size < self.minimum_block {
			return Err(EstimateError::resource_exhaustion(
				format!("blocks of {} bytes are below the minimum block size", block_size),
				self.minimum_block,
				block_size,
			));
		}
		Ok(block_size)
	}

	/// Chain sizing for records of `order`.
	pub fn chain_config(&self, order: usize) -> Result<ChainConfig> {
		let block_size = usize::try_from(self.block_size()?).unwrap_or(usize::MAX);
		let config = ChainConfig::for_order(order, block_size, self.block_count);
		config.records_per_block()?;
		Ok(config)
	}

	/// Checks thresholds and the memory plan of every order.
	pub fn validate(&self) -> Result<()> {
		self.thresholds()?;
		for order in 1..=self.order {
			self.chain_config(order)?;
		}
		Ok(())
	}
}
