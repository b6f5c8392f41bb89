//! Multinomial naive Bayes over TF-IDF features.

use serde::{Deserialize, Serialize};

use super::vectorizer::FeatureVector;
use crate::constants::training::ALPHA;
use crate::error::{Error, Result};
use crate::types::{ClassProbabilities, PredictionClass};

const N_CLASSES: usize = 2;

/// Learned parameters, as persisted in artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierState {
    /// Additive smoothing used at fit time.
    pub alpha: f64,
    /// Training samples per class, in [`PredictionClass::index`] order.
    pub class_count: [f64; N_CLASSES],
    /// Log prior per class.
    pub class_log_prior: [f64; N_CLASSES],
    /// Smoothed log P(feature | class), one row per class.
    pub feature_log_prob: [Vec<f64>; N_CLASSES],
}

/// Binary multinomial naive Bayes classifier.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    alpha: f64,
    state: Option<ClassifierState>,
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new(ALPHA)
    }
}

impl MultinomialNb {
    /// Create an unfitted classifier with smoothing `alpha`.
    pub const fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    /// Rebuild a fitted classifier from persisted state.
    pub fn from_state(state: ClassifierState) -> Result<Self> {
        let n_features = state.feature_log_prob[0].len();
        if state.feature_log_prob[1].len() != n_features {
            return Err(Error::corrupt("classifier rows have different feature counts", None));
        }
        let finite = state.class_log_prior.iter().all(|p| p.is_finite())
            && state.feature_log_prob.iter().flatten().all(|p| p.is_finite());
        if !finite {
            return Err(Error::corrupt("classifier parameters are not finite", None));
        }
        Ok(Self { alpha: state.alpha, state: Some(state) })
    }

    /// Persistable state. Fails if the classifier was never fit.
    pub fn state(&self) -> Result<&ClassifierState> {
        self.state.as_ref().ok_or(Error::ModelNotTrained { stage: "classifier" })
    }

    /// Smoothing parameter.
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether [`fit`](Self::fit) has run.
    pub const fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Number of features the classifier was fit on, or 0 when unfitted.
    pub fn n_features(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.feature_log_prob[0].len())
    }

    /// Fit on feature vectors and their labels.
    pub fn fit(&mut self, vectors: &[FeatureVector], labels: &[PredictionClass]) -> Result<()> {
        if vectors.len() != labels.len() {
            return Err(Error::dataset(format!(
                "{} feature vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        let Some(first) = vectors.first() else {
            return Err(Error::dataset("cannot fit classifier without samples"));
        };
        let n_features = first.dim();
        if vectors.iter().any(|v| v.dim() != n_features) {
            return Err(Error::dataset("feature vectors have different dimensions"));
        }

        let mut class_count = [0.0; N_CLASSES];
        let mut feature_count = [vec![0.0; n_features], vec![0.0; n_features]];
        for (vector, label) in vectors.iter().zip(labels) {
            let c = label.index();
            class_count[c] += 1.0;
            for &(j, value) in vector.entries() {
                feature_count[c][j] += value;
            }
        }
        if class_count.iter().any(|&n| n == 0.0) {
            return Err(Error::dataset("training data must contain both explicit and clean samples"));
        }

        let total: f64 = class_count.iter().sum();
        let class_log_prior = class_count.map(|n| (n / total).ln());
        let feature_log_prob = feature_count.map(|row| {
            let denom = (row.iter().sum::<f64>() + self.alpha * n_features as f64).ln();
            row.into_iter().map(|fc| (fc + self.alpha).ln() - denom).collect::<Vec<_>>()
        });

        tracing::debug!(
            "Fitted naive Bayes: {} clean / {} explicit samples, {n_features} features",
            class_count[0],
            class_count[1]
        );
        self.state = Some(ClassifierState {
            alpha: self.alpha,
            class_count,
            class_log_prior,
            feature_log_prob,
        });
        Ok(())
    }

    /// Class probabilities for one vector.
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<ClassProbabilities> {
        let jll = self.joint_log_likelihood(vector)?;
        let max = jll[0].max(jll[1]);
        let log_norm = max + jll.iter().map(|l| (l - max).exp()).sum::<f64>().ln();
        Ok(ClassProbabilities::from_pair(jll.map(|l| (l - log_norm).exp())))
    }

    /// Most likely class for one vector.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionClass> {
        let jll = self.joint_log_likelihood(vector)?;
        Ok(PredictionClass::from(jll[1] > jll[0]))
    }

    fn joint_log_likelihood(&self, vector: &FeatureVector) -> Result<[f64; N_CLASSES]> {
        let state = self.state()?;
        let n_features = state.feature_log_prob[0].len();
        if vector.dim() != n_features {
            return Err(Error::corrupt(
                format!("feature vector has {} columns, classifier expects {n_features}", vector.dim()),
                None,
            ));
        }

        let mut jll = state.class_log_prior;
        for (c, row) in state.feature_log_prob.iter().enumerate() {
            jll[c] += vector.entries().iter().map(|&(j, x)| x * row[j]).sum::<f64>();
        }
        Ok(jll)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn vec2(a: f64, b: f64) -> FeatureVector {
        FeatureVector::from_entries(2, vec![(0, a), (1, b)])
    }

    fn fitted() -> MultinomialNb {
        let vectors = vec![vec2(1.0, 0.0), vec2(0.9, 0.1), vec2(0.0, 1.0), vec2(0.2, 0.8)];
        let labels = vec![
            PredictionClass::NotExplicit,
            PredictionClass::NotExplicit,
            PredictionClass::Explicit,
            PredictionClass::Explicit,
        ];
        let mut nb = MultinomialNb::default();
        nb.fit(&vectors, &labels).unwrap();
        nb
    }

    #[test]
    fn unfitted_predict_fails() {
        let nb = MultinomialNb::default();
        assert!(matches!(
            nb.predict(&vec2(1.0, 0.0)),
            Err(Error::ModelNotTrained { stage: "classifier" })
        ));
        assert!(nb.predict_proba(&vec2(1.0, 0.0)).is_err());
    }

    #[test]
    fn separates_feature_directions() {
        let nb = fitted();
        assert_eq!(nb.predict(&vec2(1.0, 0.0)).unwrap(), PredictionClass::NotExplicit);
        assert_eq!(nb.predict(&vec2(0.0, 1.0)).unwrap(), PredictionClass::Explicit);
    }

    #[test]
    fn probabilities_sum_to_one_and_match_prediction() {
        let nb = fitted();
        for v in [vec2(1.0, 0.0), vec2(0.5, 0.5), vec2(0.1, 0.9)] {
            let p = nb.predict_proba(&v).unwrap();
            assert!((p.not_explicit + p.explicit - 1.0).abs() < 1e-9);
            assert_eq!(p.most_likely(), nb.predict(&v).unwrap());
        }
    }

    #[test]
    fn empty_vector_returns_priors() {
        let nb = fitted();
        let p = nb.predict_proba(&FeatureVector::from_entries(2, Vec::new())).unwrap();
        assert!((p.explicit - 0.5).abs() < 1e-9);
    }

    #[test]
    fn single_class_training_is_rejected() {
        let mut nb = MultinomialNb::default();
        let err = nb
            .fit(&[vec2(1.0, 0.0)], &[PredictionClass::Explicit])
            .unwrap_err();
        assert!(matches!(err, Error::Dataset { .. }));
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let nb = fitted();
        let wide = FeatureVector::from_entries(3, vec![(2, 1.0)]);
        assert!(matches!(nb.predict(&wide), Err(Error::CorruptArtifact { .. })));
    }
}
