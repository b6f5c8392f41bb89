//! Offline training: clean, split, fit, evaluate.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use super::classifier::MultinomialNb;
use super::evaluation::EvaluationReport;
use super::pipeline::{Pipeline, TrainingInfo};
use super::vectorizer::{TfidfVectorizer, VectorizerParams};
use crate::constants::training::{
    ALPHA, MAX_DF, MAX_FEATURES, MAX_NGRAM, MIN_CLEAN_CHARS, MIN_DF, SPLIT_SEED, TEST_FRACTION,
};
use crate::error::{Error, Result};
use crate::lyrics::TextNormalizer;
use crate::types::PredictionClass;

/// One labeled training document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledLyrics {
    /// Raw lyrics.
    pub text: String,
    /// Ground-truth label.
    pub label: PredictionClass,
}

impl LabeledLyrics {
    /// Label `text` as explicit or clean.
    pub fn new(text: impl Into<String>, is_explicit: bool) -> Self {
        Self { text: text.into(), label: PredictionClass::from(is_explicit) }
    }
}

/// Hyper-parameters for [`train`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    /// Vocabulary cap.
    pub max_features: usize,
    /// Minimum document frequency.
    pub min_df: usize,
    /// Maximum document frequency, as a fraction of documents.
    pub max_df: f64,
    /// Longest n-gram.
    pub max_ngram: usize,
    /// Naive Bayes smoothing.
    pub alpha: f64,
    /// Fraction held out per class for evaluation.
    pub test_fraction: f64,
    /// Shuffle seed for the split.
    pub seed: u64,
    /// Samples whose cleaned text is this long or shorter are dropped.
    pub min_clean_chars: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: MAX_FEATURES,
            min_df: MIN_DF,
            max_df: MAX_DF,
            max_ngram: MAX_NGRAM,
            alpha: ALPHA,
            test_fraction: TEST_FRACTION,
            seed: SPLIT_SEED,
            min_clean_chars: MIN_CLEAN_CHARS,
        }
    }
}

impl TrainingConfig {
    /// Vectorizer settings carried by this config.
    pub const fn vectorizer_params(&self) -> VectorizerParams {
        VectorizerParams {
            max_features: self.max_features,
            min_df: self.min_df,
            max_df: self.max_df,
            max_ngram: self.max_ngram,
        }
    }
}

/// A trained pipeline and its held-out evaluation.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The fitted pipeline.
    pub pipeline: Pipeline,
    /// Evaluation on the held-out split; `None` when nothing was held out.
    pub report: Option<EvaluationReport>,
}

/// Split sample indices into `(train, test)`, holding out `test_fraction` of
/// each class.
///
/// Every class keeps at least one training sample. The same seed always
/// produces the same split; both index lists are returned in ascending order.
pub fn stratified_split(labels: &[PredictionClass], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let fraction = test_fraction.clamp(0.0, 1.0);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for &class in PredictionClass::all() {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n_test = ((members.len() as f64 * fraction).round() as usize).min(members.len() - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    tracing::debug!("Stratified split: {} training, {} held out", train.len(), test.len());
    (train, test)
}

/// Train a pipeline on labeled lyrics.
pub fn train(samples: &[LabeledLyrics], config: &TrainingConfig) -> Result<TrainingOutcome> {
    let normalizer = TextNormalizer::new();

    let cleaned: Vec<(String, PredictionClass)> = samples
        .par_iter()
        .map(|s| (normalizer.clean(&s.text), s.label))
        .filter(|(text, _)| text.chars().count() > config.min_clean_chars)
        .collect();
    tracing::info!(
        "Kept {} of {} samples after cleaning",
        cleaned.len(),
        samples.len()
    );

    let labels: Vec<PredictionClass> = cleaned.iter().map(|(_, l)| *l).collect();
    if PredictionClass::all().iter().any(|c| !labels.contains(c)) {
        return Err(Error::dataset(
            "training data must contain both explicit and clean samples after cleaning",
        ));
    }

    let (train_idx, test_idx) = stratified_split(&labels, config.test_fraction, config.seed);
    let pick = |idx: &[usize]| -> (Vec<String>, Vec<PredictionClass>) {
        idx.iter().map(|&i| cleaned[i].clone()).unzip()
    };
    let (train_docs, train_labels) = pick(&train_idx);
    let (test_docs, test_labels) = pick(&test_idx);

    let mut vectorizer = TfidfVectorizer::new(config.vectorizer_params());
    vectorizer.fit(&train_docs)?;
    let mut classifier = MultinomialNb::new(config.alpha);
    classifier.fit(&vectorizer.transform_all(&train_docs)?, &train_labels)?;

    let report = if test_docs.is_empty() {
        None
    } else {
        let predicted = vectorizer
            .transform_all(&test_docs)?
            .iter()
            .map(|v| classifier.predict(v))
            .collect::<Result<Vec<_>>>()?;
        let report = EvaluationReport::from_predictions(&test_labels, &predicted)?;
        tracing::info!("Held-out accuracy: {:.3} on {} samples", report.accuracy, report.samples);
        Some(report)
    };

    let training = TrainingInfo {
        trained_at: Utc::now(),
        train_samples: train_docs.len(),
        test_samples: test_docs.len(),
        accuracy: report.as_ref().map(|r| r.accuracy),
    };
    let pipeline = Pipeline::new(normalizer, vectorizer, classifier, training)?;
    Ok(TrainingOutcome { pipeline, report })
}
