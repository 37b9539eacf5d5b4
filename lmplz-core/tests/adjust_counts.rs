use std::path::Path;

use lmplz_core::builder::corpus_count::{sort_suffix, write_counts};
use lmplz_core::stream::{ChainConfig, NGramReader, NGramWriter};
use lmplz_core::{
	AdjustCounts, ConfigError, Discount, DiscountProblem, EnumerateStates, EstimateError, NGram, Pipeline, PipelineConfig,
	WordIndex,
};

const X: WordIndex = 1;
const Y: WordIndex = 2;
const Z: WordIndex = 3;
const P: WordIndex = 4;
const W: WordIndex = 5;

fn writer(dir: &Path, order: usize) -> NGramWriter {
	NGramWriter::create(dir, order, &ChainConfig::for_order(order, 4096, 2)).unwrap()
}

fn outputs(dir: &Path, order: usize) -> Vec<NGramWriter> {
	(1..=order).map(|k| writer(dir, k)).collect()
}

fn gram(words: &[WordIndex], count: u64) -> NGram {
	NGram::new(words.to_vec(), count)
}

fn stream(dir: &Path, order: usize, records: &[NGram]) -> NGramReader {
	let mut out = writer(dir, order);
	write_counts(records, &mut out).unwrap();
	out.finish().unwrap()
}

/// Three trigrams sharing the context `y`, already in suffix order.
fn scenario_input(dir: &Path) -> NGramReader {
	stream(dir, 3, &[gram(&[X, Y, Z], 1), gram(&[P, Y, Z], 1), gram(&[X, Y, W], 1)])
}

fn records(stream: NGramReader) -> Vec<(Vec<WordIndex>, u64)> {
	stream
		.collect_ngrams()
		.unwrap()
		.into_iter()
		.map(|g| (g.words, g.count))
		.collect()
}

#[test]
fn continuation_counts_without_pruning() {
	let dir = tempfile::tempdir().unwrap();
	let adjusted = AdjustCounts::new(&[0, 0, 0])
		.adjust(scenario_input(dir.path()), outputs(dir.path(), 3), None)
		.unwrap();

	assert_eq!(adjusted.stats.counts(), vec![2, 2, 3]);
	assert_eq!(adjusted.stats.counts_pruned(), vec![2, 2, 3]);

	let mut streams = adjusted.streams.into_iter();
	let unigrams = records(streams.next().unwrap());
	let bigrams = records(streams.next().unwrap());
	let trigrams = records(streams.next().unwrap());
	assert_eq!(unigrams, vec![(vec![Z], 1), (vec![W], 1)]);
	assert_eq!(bigrams, vec![(vec![Y, Z], 2), (vec![Y, W], 1)]);
	assert_eq!(trigrams, vec![(vec![X, Y, Z], 1), (vec![P, Y, Z], 1), (vec![X, Y, W], 1)]);
}

#[test]
fn too_few_statistics_fail_discounting() {
	let dir = tempfile::tempdir().unwrap();
	let err = AdjustCounts::new(&[0, 0, 0])
		.run(scenario_input(dir.path()), outputs(dir.path(), 3), None)
		.unwrap_err();
	assert!(matches!(err, EstimateError::BadDiscount { order: 1, .. }));
}

#[test]
fn pruned_contexts_are_counted_but_not_kept() {
	let dir = tempfile::tempdir().unwrap();
	let adjusted = AdjustCounts::new(&[0, 2, 0])
		.adjust(scenario_input(dir.path()), outputs(dir.path(), 3), None)
		.unwrap();

	assert_eq!(adjusted.stats.counts(), vec![2, 2, 3]);
	assert_eq!(adjusted.stats.counts_pruned(), vec![2, 0, 3]);
	// Both bigrams still show up in the histogram.
	assert_eq!(adjusted.stats.get(2).n, [0, 1, 1, 0, 0]);

	let mut streams = adjusted.streams.into_iter();
	let unigrams = records(streams.next().unwrap());
	let bigrams = records(streams.next().unwrap());
	// No bigram survived, so no unigram has a surviving extension.
	assert_eq!(unigrams, vec![(vec![Z], 0), (vec![W], 0)]);
	assert!(bigrams.is_empty());
}

#[test]
fn kept_contexts_without_surviving_extensions_have_zero_count() {
	let dir = tempfile::tempdir().unwrap();
	let adjusted = AdjustCounts::new(&[0, 0, 2])
		.adjust(scenario_input(dir.path()), outputs(dir.path(), 3), None)
		.unwrap();

	assert_eq!(adjusted.stats.counts(), vec![2, 2, 3]);
	assert_eq!(adjusted.stats.counts_pruned(), vec![2, 2, 0]);
	assert_eq!(adjusted.stats.get(2).n, [2, 0, 0, 0, 0]);
	assert_eq!(adjusted.stats.get(1).n, [0, 2, 0, 0, 0]);

	// Zero counts never reach n1..n4, so this order cannot be discounted.
	let err = Discount::estimate(2, &adjusted.stats.get(2).discount_buckets()).unwrap_err();
	assert!(matches!(
		err,
		EstimateError::BadDiscount { order: 2, problem: DiscountProblem::MissingCount { adjusted_count: 1 } }
	));

	let mut streams = adjusted.streams.into_iter();
	let unigrams = records(streams.next().unwrap());
	let bigrams = records(streams.next().unwrap());
	let trigrams = records(streams.next().unwrap());
	// Bigrams survive their own threshold with no surviving trigram, and
	// still count as extensions of their unigram suffixes.
	assert_eq!(unigrams, vec![(vec![Z], 1), (vec![W], 1)]);
	assert_eq!(bigrams, vec![(vec![Y, Z], 0), (vec![Y, W], 0)]);
	assert!(trigrams.is_empty());
}

#[test]
fn threshold_length_is_checked_before_reading() {
	let dir = tempfile::tempdir().unwrap();
	let err = AdjustCounts::new(&[0, 0])
		.run(scenario_input(dir.path()), outputs(dir.path(), 3), None)
		.unwrap_err();
	assert!(matches!(
		err,
		EstimateError::Configuration(ConfigError::ThresholdLength { expected: 3, actual: 2 })
	));
}

#[test]
fn outputs_must_match_orders() {
	let dir = tempfile::tempdir().unwrap();
	let mut wrong = outputs(dir.path(), 2);
	wrong.push(writer(dir.path(), 2));
	let err = AdjustCounts::new(&[0, 0, 0])
		.run(scenario_input(dir.path()), wrong, None)
		.unwrap_err();
	assert!(matches!(
		err,
		EstimateError::Configuration(ConfigError::OutputOrder { expected: 3, actual: 2 })
	));

	let err = AdjustCounts::new(&[0, 0, 0])
		.run(scenario_input(dir.path()), outputs(dir.path(), 2), None)
		.unwrap_err();
	assert!(matches!(
		err,
		EstimateError::Configuration(ConfigError::OutputCount { expected: 3, actual: 2 })
	));
}

#[test]
fn missing_singletons_fail_discounting() {
	let dir = tempfile::tempdir().unwrap();
	let input = stream(dir.path(), 1, &[gram(&[1], 2), gram(&[2], 3), gram(&[3], 4)]);
	let err = AdjustCounts::new(&[0]).run(input, outputs(dir.path(), 1), None).unwrap_err();
	assert!(matches!(
		err,
		EstimateError::BadDiscount { order: 1, problem: DiscountProblem::MissingCount { adjusted_count: 1 } }
	));
}

#[test]
fn unsorted_input_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let input = stream(dir.path(), 2, &[gram(&[X, W], 1), gram(&[X, Z], 1)]);
	let err = AdjustCounts::new(&[0, 0])
		.adjust(input, outputs(dir.path(), 2), None)
		.unwrap_err();
	assert!(matches!(err, EstimateError::UnsortedInput { position: 1 }));

	let input = stream(dir.path(), 2, &[gram(&[X, Z], 1), gram(&[X, Z], 1)]);
	let err = AdjustCounts::new(&[0, 0])
		.adjust(input, outputs(dir.path(), 2), None)
		.unwrap_err();
	assert!(matches!(err, EstimateError::UnsortedInput { position: 1 }));
}

#[test]
fn empty_input_gives_empty_orders() {
	let dir = tempfile::tempdir().unwrap();
	let input = stream(dir.path(), 3, &[]);
	let output = AdjustCounts::new(&[0, 0, 0])
		.run(input, outputs(dir.path(), 3), None)
		.unwrap();
	assert_eq!(output.counts, vec![0, 0, 0]);
	assert_eq!(output.counts_pruned, vec![0, 0, 0]);
	assert!(output.discounts.iter().all(|d| d.amount == [0.0; 4]));
}

#[test]
fn hook_sees_kept_states_in_close_order() {
	let dir = tempfile::tempdir().unwrap();
	let mut seen: Vec<Vec<WordIndex>> = Vec::new();
	let mut record = |ngram: &[WordIndex]| seen.push(ngram.to_vec());
	let hook: &mut dyn EnumerateStates = &mut record;
	AdjustCounts::new(&[0, 0, 0])
		.adjust(scenario_input(dir.path()), outputs(dir.path(), 3), Some(hook))
		.unwrap();
	assert_eq!(seen, vec![vec![Y, Z], vec![Z], vec![Y, W], vec![W]]);
}

#[test]
fn hook_skips_pruned_states() {
	let dir = tempfile::tempdir().unwrap();
	let mut seen: Vec<Vec<WordIndex>> = Vec::new();
	let mut record = |ngram: &[WordIndex]| seen.push(ngram.to_vec());
	let hook: &mut dyn EnumerateStates = &mut record;
	AdjustCounts::new(&[0, 2, 0])
		.adjust(scenario_input(dir.path()), outputs(dir.path(), 3), Some(hook))
		.unwrap();
	assert_eq!(seen, vec![vec![Z], vec![W]]);
}

/// Bigrams over 15 right words whose left-extension counts are
/// 8 x 1, 4 x 2, 2 x 3 and 1 x 4, with raw counts 14 x 1, 7 x 2, 3 x 3
/// and 2 x 4.
fn discountable_bigrams() -> Vec<NGram> {
	let lefts = [(1, 8), (2, 4), (3, 2), (4, 1)]
		.into_iter()
		.flat_map(|(distinct, times)| std::iter::repeat(distinct).take(times));
	let mut raw = [(1u64, 14), (2, 7), (3, 3), (4, 2)]
		.into_iter()
		.flat_map(|(count, times)| std::iter::repeat(count).take(times));

	let mut counts = std::collections::HashMap::new();
	for (i, distinct) in lefts.enumerate() {
		let right = 100 + i as WordIndex;
		for left in 1..=distinct {
			counts.insert(vec![left, right], raw.next().unwrap());
		}
	}
	sort_suffix(counts)
}

#[test]
fn discounts_follow_count_of_counts() {
	let dir = tempfile::tempdir().unwrap();
	let mut input = writer(dir.path(), 2);
	write_counts(&discountable_bigrams(), &mut input).unwrap();

	let output = AdjustCounts::new(&[0, 0])
		.run(input.finish().unwrap(), outputs(dir.path(), 2), None)
		.unwrap();

	assert_eq!(output.counts, vec![15, 26]);
	assert_eq!(output.counts_pruned, vec![15, 26]);

	let unigram = output.discounts[0];
	assert!((unigram.d1() - 0.5).abs() < 1e-5);
	assert!((unigram.d2() - 1.25).abs() < 1e-5);
	assert!((unigram.d3_plus() - 2.0).abs() < 1e-5);

	let bigram = output.discounts[1];
	assert!((bigram.d1() - 0.5).abs() < 1e-5);
	assert!((bigram.d2() - (2.0 - 1.5 * 3.0 / 7.0)).abs() < 1e-5);
	assert!((bigram.d3_plus() - (3.0 - 4.0 / 3.0)).abs() < 1e-5);
}

#[test]
fn pipeline_counts_and_adjusts_a_corpus() {
	let dir = tempfile::tempdir().unwrap();
	let config = PipelineConfig::new(2)
		.with_temp_prefix(dir.path().to_str().unwrap())
		.with_memory("1M")
		.unwrap();
	let pipeline = Pipeline::new(config).unwrap();

	// Same bigrams as above, one sentence per occurrence.
	let mut sentences = Vec::new();
	for gram in discountable_bigrams() {
		for _ in 0..gram.count {
			sentences.push(gram.words.clone());
		}
	}

	let output = pipeline.run(&sentences, None).unwrap();
	assert_eq!(output.counts, vec![15, 26]);
	assert_eq!(output.streams.len(), 2);
	assert!((output.discounts[0].d2() - 1.25).abs() < 1e-5);
}
