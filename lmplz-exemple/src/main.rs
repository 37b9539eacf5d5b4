use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use lmplz_core::io::read_sentences;
use lmplz_core::{EnumerateStates, EstimateError, EstimateSummary, Pipeline, PipelineConfig, WordIndex};
use rand::Rng;

/// Vocabulary size of the synthetic corpus.
const SYNTHETIC_VOCAB: usize = 5_000;

fn main() -> ExitCode {
    // Logging is configured with RUST_LOG, e.g. RUST_LOG=debug
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Resource errors carry their own remedy in the message
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), EstimateError> {
    // Usage: lmplz-exemple [corpus.txt] [order] [thresholds]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let corpus = args.first().filter(|path| !path.is_empty());
    let order: usize = match args.get(1) {
        Some(order) => order.parse().map_err(|_| lmplz_core::ConfigError::InvalidOrder)?,
        None => 3,
    };
    let thresholds = args.get(2).map(String::as_str).unwrap_or("");

    // Lines of text, either from the given file or generated
    let (lines, output) = match corpus {
        Some(path) => (read_sentences(path)?, PathBuf::from(path)),
        None => (synthetic_corpus(2_000), std::env::temp_dir().join("lmplz-synthetic.txt")),
    };

    // Map every word to an index; the vocabulary only lives for this run
    let mut vocab: HashMap<String, WordIndex> = HashMap::new();
    let sentences: Vec<Vec<WordIndex>> = lines
        .iter()
        .map(|line| {
            line.split_whitespace()
                .map(|word| {
                    let next = vocab.len() as WordIndex;
                    *vocab.entry(word.to_owned()).or_insert(next)
                })
                .collect()
        })
        .collect();
    println!("{} sentences, {} distinct words", sentences.len(), vocab.len());

    // Keep the memory budget small: the chains only need a few blocks each
    let config = PipelineConfig::new(order)
        .with_memory("64M")?
        .with_pruning(thresholds)?
        .with_temp_prefix("");
    let pipeline = Pipeline::new(config)?;

    // Count the states (contexts) that survive pruning
    let mut contexts = 0u64;
    let mut count_contexts = |_: &[WordIndex]| contexts += 1;
    let hook: &mut dyn EnumerateStates = &mut count_contexts;
    let output_counts = pipeline.run(&sentences, Some(hook))?;
    println!("{} contexts kept for the next stage", contexts);

    for (i, (count, pruned)) in output_counts
        .counts
        .iter()
        .zip(&output_counts.counts_pruned)
        .enumerate()
    {
        let discount = output_counts.discounts[i];
        println!(
            "{}-grams: {} seen, {} kept, D1={:.4} D2={:.4} D3+={:.4}",
            i + 1,
            count,
            pruned,
            discount.d1(),
            discount.d2(),
            discount.d3_plus()
        );
    }

    // Save the summary next to the corpus
    let summary = EstimateSummary::from_output(&output_counts);
    let path = summary.save(&output)?;
    println!("Summary saved to {}", path.display());

    Ok(())
}

/// Generates `count` random sentences of words `w0`, `w1`, ... with a
/// skewed distribution: a few frequent words and a long tail of rare ones.
fn synthetic_corpus(count: usize) -> Vec<String> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            let len = rng.random_range(3..12);
            (0..len)
                .map(|_| {
                    let r: f64 = rng.random();
                    format!("w{}", (r.powi(4) * SYNTHETIC_VOCAB as f64) as usize)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
