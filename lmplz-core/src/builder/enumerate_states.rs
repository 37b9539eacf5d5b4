use super::ngram::WordIndex;

/// Receives every state (context) the adjustment pass keeps.
///
/// Implement this to observe all lower-order n-grams that survive pruning,
/// then lend it to [`super::adjust_counts::AdjustCounts::run`]. The engine
/// calls `add` once per state during that single call and never keeps the
/// reference afterwards.
pub trait EnumerateStates {
	fn add(&mut self, ngram: &[WordIndex]);
}

impl<F> EnumerateStates for F
where
	F: FnMut(&[WordIndex]),
{
	fn add(&mut self, ngram: &[WordIndex]) {
		self(ngram)
	}
}
