//! `lyricscan` - explicit-content classification for song lyrics.
//!
//! This crate classifies lyrics as explicit or clean with a trained
//! TF-IDF + naive Bayes pipeline, and explains a verdict by scoring each
//! word against the model and a curated lexicon.

// Re-export public modules for use in integration tests and as a library
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod lexicon;
pub mod lyrics;
pub mod model;
pub mod services;
pub mod types;

pub use error::{Error, Result};
pub use services::LyricsAnalyzer;
