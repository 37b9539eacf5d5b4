use serde::{Deserialize, Serialize};

use crate::error::{DiscountProblem, EstimateError, Result};

/// Modified Kneser-Ney discounts of one order.
///
/// `amount[c]` is subtracted from an n-gram with adjusted count `c`; counts
/// above 3 share `amount[3]` (D3+). `amount[0]` is always 0.
///
/// # Invariants
/// - `0 <= amount[1] <= amount[2] <= amount[3]`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Discount {
	pub amount: [f32; 4],
}

impl Discount {
	/// Estimates the discounts from a count-of-counts histogram, following
	/// equation (26) of Chen and Goodman.
	///
	/// `n[c]` is the number of n-grams with adjusted count exactly `c` for
	/// `c` in 1..=3 and `n[4]` those with adjusted count 4 or more (`n[0]` is
	/// ignored). `order` is only used in errors.
	///
	/// ```text
	/// Y   = n1 / (n1 + 2 n2)
	/// Dc  = c - (c + 1) Y n(c+1) / n(c)      for c in 1..=3
	/// ```
	///
	/// # Errors
	/// Returns [`EstimateError::BadDiscount`] if n1, n2 or n3 is zero, if a
	/// discount falls outside `[0, c]` or if the discounts are not
	/// increasing. Values are never clamped.
	pub fn estimate(order: usize, n: &[u64; 5]) -> Result<Self> {
		for adjusted_count in 1..4u8 {
			if n[usize::from(adjusted_count)] == 0 {
				return Err(EstimateError::bad_discount(order, DiscountProblem::MissingCount { adjusted_count }));
			}
		}

		let n: [f64; 5] = n.map(|v| v as f64);
		let y = n[1] / (n[1] + 2.0 * n[2]);

		let mut discount = Self::default();
		for bucket in 1..4usize {
			let c = bucket as f64;
			let value = c - (c + 1.0) * y * n[bucket + 1] / n[bucket];
			if !value.is_finite() || value < 0.0 || value > c {
				return Err(EstimateError::bad_discount(
					order,
					DiscountProblem::OutOfRange { bucket: bucket as u8, value: value as f32 },
				));
			}
			discount.amount[bucket] = value as f32;
		}

		for bucket in 1..3usize {
			let (lower, higher) = (discount.amount[bucket], discount.amount[bucket + 1]);
			if lower > higher {
				return Err(EstimateError::bad_discount(
					order,
					DiscountProblem::NotMonotonic { bucket: bucket as u8, lower, higher },
				));
			}
		}

		Ok(discount)
	}

	/// Discount for an n-gram with the given adjusted count.
	pub fn get(&self, count: u64) -> f32 {
		self.amount[count.min(3) as usize]
	}

	/// Discounted count.
	pub fn apply(&self, count: u64) -> f32 {
		count as f32 - self.get(count)
	}

	pub fn d1(&self) -> f32 {
		self.amount[1]
	}

	pub fn d2(&self) -> f32 {
		self.amount[2]
	}

	pub fn d3_plus(&self) -> f32 {
		self.amount[3]
	}
}
