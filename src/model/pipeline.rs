//! Normalize → vectorize → classify, as one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::MultinomialNb;
use super::vectorizer::{FeatureVector, TfidfVectorizer};
use crate::error::{Error, Result};
use crate::lyrics::TextNormalizer;
use crate::types::{ClassProbabilities, PredictionClass};

/// Provenance recorded when a pipeline is trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingInfo {
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Samples the classifier was fit on.
    pub train_samples: usize,
    /// Held-out samples used for evaluation.
    pub test_samples: usize,
    /// Held-out accuracy, when a test split existed.
    pub accuracy: Option<f64>,
}

/// A trained, immutable classification pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    normalizer: TextNormalizer,
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
    training: TrainingInfo,
}

impl Pipeline {
    /// Compose fitted stages. Stages must be fit and agree on feature count.
    pub fn new(
        normalizer: TextNormalizer,
        vectorizer: TfidfVectorizer,
        classifier: MultinomialNb,
        training: TrainingInfo,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(Error::ModelNotTrained { stage: "vectorizer" });
        }
        if !classifier.is_fitted() {
            return Err(Error::ModelNotTrained { stage: "classifier" });
        }
        if vectorizer.vocabulary_size() != classifier.n_features() {
            return Err(Error::corrupt(
                format!(
                    "vectorizer has {} terms but classifier expects {} features",
                    vectorizer.vocabulary_size(),
                    classifier.n_features()
                ),
                None,
            ));
        }
        Ok(Self { normalizer, vectorizer, classifier, training })
    }

    /// The normalization stage.
    pub const fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// The vectorization stage.
    pub const fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// The classification stage.
    pub const fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    /// Training provenance.
    pub const fn training(&self) -> &TrainingInfo {
        &self.training
    }

    /// Vocabulary size of the frozen vectorizer.
    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Labels for raw lyrics documents, in input order.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<PredictionClass>> {
        texts
            .iter()
            .map(|t| self.classifier.predict(&self.features(t.as_ref())?))
            .collect()
    }

    /// Class probabilities for raw lyrics documents, in input order.
    pub fn predict_proba<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ClassProbabilities>> {
        texts.iter().map(|t| self.predict_proba_one(t.as_ref())).collect()
    }

    /// Class probabilities for one raw lyrics document.
    ///
    /// Text with no in-vocabulary terms yields the class priors.
    pub fn predict_proba_one(&self, text: &str) -> Result<ClassProbabilities> {
        self.classifier.predict_proba(&self.features(text)?)
    }

    /// Like [`predict_proba_one`](Self::predict_proba_one), but fails with
    /// [`Error::DegenerateFeatures`] when no term of `text` is in the vocabulary.
    pub fn predict_proba_informative(&self, text: &str) -> Result<ClassProbabilities> {
        let features = self.features(text)?;
        if features.is_empty() {
            return Err(Error::DegenerateFeatures { text: text.to_string() });
        }
        self.classifier.predict_proba(&features)
    }

    fn features(&self, text: &str) -> Result<FeatureVector> {
        self.vectorizer.transform(&self.normalizer.clean(text))
    }
}
