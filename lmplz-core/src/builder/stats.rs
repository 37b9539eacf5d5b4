use serde::{Deserialize, Serialize};

use super::discount::Discount;
use crate::error::Result;

/// Statistics of one order, filled while the adjustment pass runs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderStat {
	/// N-grams seen, pruned or not.
	pub count: u64,
	/// N-grams kept after pruning.
	pub count_pruned: u64,
	/// `n[c]`: n-grams whose adjusted count is exactly `c`, for `c < 5`.
	pub n: [u64; 5],
	/// N-grams with adjusted count of 5 or more.
	pub n_more: u64,
}

impl OrderStat {
	fn add(&mut self, count: u64, pruned: bool) {
		self.count += 1;
		if !pruned {
			self.count_pruned += 1;
		}
		match usize::try_from(count) {
			Ok(c) if c < self.n.len() => self.n[c] += 1,
			_ => self.n_more += 1,
		}
	}

	/// Histogram as the discount formula reads it: `[_, n1, n2, n3, n4+]`,
	/// where the last bucket holds every adjusted count of 4 and above.
	pub fn discount_buckets(&self) -> [u64; 5] {
		let mut buckets = self.n;
		buckets[4] += self.n_more;
		buckets
	}
}

/// Per-order count-of-counts histograms.
///
/// Pruning never hides an n-gram from the histogram: the statistics describe
/// the corpus, the pruned counts describe what the model keeps.
#[derive(Clone, Debug)]
pub struct StatCollector {
	orders: Vec<OrderStat>,
}

impl StatCollector {
	/// Creates empty statistics for orders `1..=order`.
	pub fn new(order: usize) -> Self {
		Self { orders: vec![OrderStat::default(); order] }
	}

	/// Number of orders tracked.
	pub fn order(&self) -> usize {
		self.orders.len()
	}

	/// Records one n-gram of order `order_minus_1 + 1`.
	pub fn add(&mut self, order_minus_1: usize, count: u64, pruned: bool) {
		self.orders[order_minus_1].add(count, pruned);
	}

	/// Statistics of a 1-based `order`.
	pub fn get(&self, order: usize) -> &OrderStat {
		&self.orders[order - 1]
	}

	pub fn iter(&self) -> impl Iterator<Item = &OrderStat> {
		self.orders.iter()
	}

	/// CountsVector: n-grams seen per order.
	pub fn counts(&self) -> Vec<u64> {
		self.orders.iter().map(|s| s.count).collect()
	}

	/// CountsPrunedVector: n-grams kept per order.
	pub fn counts_pruned(&self) -> Vec<u64> {
		self.orders.iter().map(|s| s.count_pruned).collect()
	}

	/// Estimates the discounts of every order.
	///
	/// Orders where nothing survived pruning have no model entries to
	/// discount and get the zero discount; every other order must yield a
	/// valid estimate.
	///
	/// # Errors
	/// The first [`crate::EstimateError::BadDiscount`] encountered, lowest
	/// order first.
	pub fn calculate_discounts(&self) -> Result<Vec<Discount>> {
		let mut discounts = Vec::with_capacity(self.orders.len());
		for (i, stat) in self.orders.iter().enumerate() {
			let order = i + 1;
			if stat.count_pruned == 0 {
				log::warn!("No {}-grams survived, skipping discount estimation for this order", order);
				discounts.push(Discount::default());
				continue;
			}
			let discount = Discount::estimate(order, &stat.discount_buckets())?;
			log::info!(
				"Discounts for {}-grams: D1={:.4} D2={:.4} D3+={:.4}",
				order,
				discount.d1(),
				discount.d2(),
				discount.d3_plus()
			);
			discounts.push(discount);
		}
		Ok(discounts)
	}
}
