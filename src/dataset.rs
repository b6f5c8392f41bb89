//! Labeled lyrics datasets.
//!
//! Loads CSV exports with a lyrics column and an explicit-flag column, and
//! provides the length filter and near-duplicate removal used before training.

use std::collections::HashSet;
use std::path::Path;

use crate::constants::dataset::{DUPLICATE_THRESHOLD, MAX_WORDS, MIN_WORDS};
use crate::error::{Error, Result};
use crate::lyrics::TextNormalizer;
use crate::model::LabeledLyrics;
use crate::types::PredictionClass;

/// Samples read from a CSV file.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    /// Usable rows, in file order.
    pub samples: Vec<LabeledLyrics>,
    /// Rows dropped for missing text or an unrecognized label.
    pub skipped: usize,
}

impl LoadedDataset {
    /// Number of explicit samples.
    pub fn explicit_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label == PredictionClass::Explicit).count()
    }
}

/// Interpret an explicit-flag cell.
///
/// Accepts `true/false`, `yes/no` and `1/0`, case-insensitively.
pub fn parse_label(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Load labeled lyrics from a CSV file with a header row.
pub fn load_csv(path: &Path, text_column: &str, label_column: &str) -> Result<LoadedDataset> {
    let file = fs_err::File::open(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| Error::parse(format!("reading CSV headers: {e}"), path.to_path_buf()))?
        .clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            Error::parse(format!("CSV is missing the '{name}' column"), path.to_path_buf())
        })
    };
    let text_idx = column(text_column)?;
    let label_idx = column(label_column)?;

    let mut dataset = LoadedDataset::default();
    for record in reader.records() {
        let record = record.map_err(|e| match Error::from(e) {
            Error::Parse { message, .. } => Error::parse(message, path.to_path_buf()),
            other => other,
        })?;

        let text = record.get(text_idx).map(str::trim).filter(|t| !t.is_empty());
        let label = record.get(label_idx).and_then(parse_label);
        match (text, label) {
            (Some(text), Some(is_explicit)) => dataset.samples.push(LabeledLyrics::new(text, is_explicit)),
            _ => dataset.skipped += 1,
        }
    }

    tracing::info!(
        "Loaded {} samples ({} explicit, {} skipped) from {}",
        dataset.samples.len(),
        dataset.explicit_count(),
        dataset.skipped,
        path.display()
    );
    Ok(dataset)
}

/// Keep samples whose cleaned word count lies in `[min_words, max_words]`.
pub fn filter_by_length(
    normalizer: &TextNormalizer,
    samples: Vec<LabeledLyrics>,
    min_words: usize,
    max_words: usize,
) -> Vec<LabeledLyrics> {
    samples
        .into_iter()
        .filter(|s| (min_words..=max_words).contains(&normalizer.tokens(&s.text).len()))
        .collect()
}

/// Drop samples whose normalized token set has Jaccard similarity of at least
/// `threshold` with an earlier kept sample.
///
/// Samples with no tokens are never considered duplicates.
pub fn deduplicate(normalizer: &TextNormalizer, samples: Vec<LabeledLyrics>, threshold: f64) -> Vec<LabeledLyrics> {
    let mut kept_sets: Vec<HashSet<String>> = Vec::new();
    let mut kept = Vec::new();
    let total = samples.len();

    for sample in samples {
        let tokens: HashSet<String> = normalizer.tokens(&sample.text).into_iter().collect();
        let duplicate = !tokens.is_empty()
            && kept_sets
                .iter()
                .any(|other| !other.is_empty() && jaccard(&tokens, other) >= threshold);
        if !duplicate {
            kept_sets.push(tokens);
            kept.push(sample);
        }
    }

    tracing::debug!("Removed {} near-duplicate samples", total - kept.len());
    kept
}

/// Length filter with the default bounds followed by deduplication with the
/// default threshold.
pub fn clean_dataset(normalizer: &TextNormalizer, samples: Vec<LabeledLyrics>) -> Vec<LabeledLyrics> {
    let filtered = filter_by_length(normalizer, samples, MIN_WORDS, MAX_WORDS);
    deduplicate(normalizer, filtered, DUPLICATE_THRESHOLD)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
