//! Held-out evaluation metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::PredictionClass;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// The class these metrics describe.
    pub class: PredictionClass,
    /// Correct predictions of `class` over all predictions of `class`.
    pub precision: f64,
    /// Correct predictions of `class` over all true `class` samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// True samples of `class`.
    pub support: usize,
}

/// Classification report over a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Metrics per class, in [`PredictionClass::all`] order.
    pub per_class: Vec<ClassMetrics>,
    /// Number of evaluated samples.
    pub samples: usize,
}

impl EvaluationReport {
    /// Compare `predicted` against `actual`, position by position.
    pub fn from_predictions(actual: &[PredictionClass], predicted: &[PredictionClass]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(Error::dataset(format!(
                "{} labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        if actual.is_empty() {
            return Err(Error::dataset("cannot evaluate an empty test set"));
        }

        let pairs = || actual.iter().zip(predicted);
        let correct = pairs().filter(|(a, p)| a == p).count();

        let per_class = PredictionClass::all()
            .iter()
            .map(|&class| {
                let tp = pairs().filter(|&(a, p)| *a == class && *p == class).count();
                let predicted_n = predicted.iter().filter(|&&p| p == class).count();
                let support = actual.iter().filter(|&&a| a == class).count();
                let precision = ratio(tp, predicted_n);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics { class, precision, recall, f1, support }
            })
            .collect();

        Ok(Self {
            accuracy: ratio(correct, actual.len()),
            per_class,
            samples: actual.len(),
        })
    }

    /// Metrics for `class`.
    pub fn class(&self, class: PredictionClass) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.class == class)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.class.label(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        write!(f, "{:>14} {:>29.4} {:>9}", "accuracy", self.accuracy, self.samples)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::types::PredictionClass::{Explicit as E, NotExplicit as N};

    #[test]
    fn computes_per_class_metrics() {
        let actual = [N, N, N, E, E];
        let predicted = [N, N, E, E, N];
        let report = EvaluationReport::from_predictions(&actual, &predicted).unwrap();

        assert!((report.accuracy - 0.6).abs() < 1e-9);
        let explicit = report.class(E).unwrap();
        assert!((explicit.precision - 0.5).abs() < 1e-9);
        assert!((explicit.recall - 0.5).abs() < 1e-9);
        assert_eq!(explicit.support, 2);
        let clean = report.class(N).unwrap();
        assert!((clean.recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(clean.support, 3);
    }

    #[test]
    fn never_predicted_class_has_zero_precision() {
        let report = EvaluationReport::from_predictions(&[N, E], &[N, N]).unwrap();
        let explicit = report.class(E).unwrap();
        assert!(explicit.precision.abs() < f64::EPSILON);
        assert!(explicit.f1.abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(EvaluationReport::from_predictions(&[N], &[]).is_err());
        assert!(EvaluationReport::from_predictions(&[], &[]).is_err());
    }

    #[test]
    fn display_lists_both_classes() {
        let report = EvaluationReport::from_predictions(&[N, E], &[N, E]).unwrap();
        let text = report.to_string();
        assert!(text.contains("not_explicit"));
        assert!(text.contains("accuracy"));
    }
}
