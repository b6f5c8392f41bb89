//! Explicit-lyrics model.
//!
//! A [`Pipeline`] chains the lyrics normalizer, a TF-IDF vectorizer with a
//! frozen vocabulary, and a multinomial naive Bayes classifier. Pipelines are
//! produced by [`train`] and persisted with [`artifact::save`] /
//! [`artifact::load`].

pub mod artifact;
mod classifier;
mod evaluation;
mod pipeline;
mod training;
mod vectorizer;

pub use artifact::PipelineArtifact;
pub use classifier::{ClassifierState, MultinomialNb};
pub use evaluation::{ClassMetrics, EvaluationReport};
pub use pipeline::{Pipeline, TrainingInfo};
pub use training::{stratified_split, train, LabeledLyrics, TrainingConfig, TrainingOutcome};
pub use vectorizer::{FeatureVector, TfidfVectorizer, VectorizerParams, VectorizerState};
