//! Retrain the explicit-lyrics model from a labeled CSV dataset.
//!
//! Usage: cargo run --bin retrain -- [--dataset data/spotify_dataset.csv] [--output saved_models/...]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use lyricscan::config::Config;
use lyricscan::constants::training::{
    ALPHA, LABEL_COLUMN, MAX_DF, MAX_FEATURES, MIN_DF, SPLIT_SEED, TEST_FRACTION, TEXT_COLUMN,
};
use lyricscan::dataset;
use lyricscan::lyrics::TextNormalizer;
use lyricscan::model::{artifact, train, Pipeline, TrainingConfig};
use lyricscan::types::Verdict;

/// Sentences printed after training as a quick sanity check.
const SMOKE_SENTENCES: &[&str] = &[
    "I love you so much, you are amazing",
    "This fucking song is shit",
    "Beautiful day with sunshine",
    "Damn this is a great song",
];

#[derive(Parser, Debug)]
#[command(name = "retrain", version, about = "Train the explicit-lyrics classifier and save the artifact.")]
struct Args {
    /// Labeled CSV dataset; defaults to LYRICSCAN_DATASET_PATH
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Where to write the artifact; defaults to LYRICSCAN_MODEL_PATH
    #[arg(long)]
    output: Option<PathBuf>,

    /// Column holding the lyrics
    #[arg(long, default_value = TEXT_COLUMN)]
    text_column: String,

    /// Column holding the explicit flag
    #[arg(long, default_value = LABEL_COLUMN)]
    label_column: String,

    /// Vocabulary cap
    #[arg(long, default_value_t = MAX_FEATURES)]
    max_features: usize,

    /// Minimum document frequency
    #[arg(long, default_value_t = MIN_DF)]
    min_df: usize,

    /// Maximum document frequency, as a fraction
    #[arg(long, default_value_t = MAX_DF)]
    max_df: f64,

    /// Naive Bayes smoothing
    #[arg(long, default_value_t = ALPHA)]
    alpha: f64,

    /// Fraction held out for evaluation
    #[arg(long, default_value_t = TEST_FRACTION)]
    test_fraction: f64,

    /// Split seed
    #[arg(long, default_value_t = SPLIT_SEED)]
    seed: u64,

    /// Drop short samples and near duplicates before training
    #[arg(long)]
    clean: bool,
}

impl Args {
    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            max_features: self.max_features,
            min_df: self.min_df,
            max_df: self.max_df,
            alpha: self.alpha,
            test_fraction: self.test_fraction,
            seed: self.seed,
            ..TrainingConfig::default()
        }
    }
}

fn smoke_test(pipeline: &Pipeline) -> Result<()> {
    println!("\nSmoke test:");
    for sentence in SMOKE_SENTENCES {
        let verdict = Verdict::from_probabilities(&pipeline.predict_proba_one(sentence)?);
        println!(
            "  {:<40} {:<12} {:.3}",
            sentence,
            verdict.class_label.label(),
            verdict.confidence
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lyricscan=info,retrain=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let dataset_path = args.dataset.clone().unwrap_or(config.dataset_path);
    let output_path = args.output.clone().unwrap_or(config.model_path);

    let loaded = dataset::load_csv(&dataset_path, &args.text_column, &args.label_column)
        .with_context(|| format!("loading dataset {}", dataset_path.display()))?;
    println!(
        "Dataset: {} samples ({} explicit), {} rows skipped",
        loaded.samples.len(),
        loaded.explicit_count(),
        loaded.skipped
    );

    let samples = if args.clean {
        let cleaned = dataset::clean_dataset(&TextNormalizer::new(), loaded.samples);
        println!("After length filter and deduplication: {} samples", cleaned.len());
        cleaned
    } else {
        loaded.samples
    };

    let outcome = train(&samples, &args.training_config())?;
    match &outcome.report {
        Some(report) => println!("\nAccuracy: {:.3}\n\n{report}", report.accuracy),
        None => println!("\nNo held-out samples; skipped evaluation"),
    }

    artifact::save(&outcome.pipeline, &output_path)?;
    println!("\nModel saved to {}", output_path.display());

    smoke_test(&outcome.pipeline)
}
