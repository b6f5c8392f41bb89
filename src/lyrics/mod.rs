//! Lyrics text processing.
//!
//! Cleaning raw lyrics into stem tokens for the vectorizer, plus surface
//! statistics used when preparing datasets.

mod language;
mod normalizer;
mod stats;

pub use normalizer::{NormalizerConfig, TextNormalizer};
pub use stats::{text_stats, word_frequencies, TextStats};
