//! Classification services.
//!
//! The model registry, whole-document classification, per-word attribution
//! and the [`LyricsAnalyzer`] facade that front ends call into.

pub mod analyzer;
pub mod attribution;
pub mod classify;
pub mod registry;

pub use analyzer::{LyricsAnalyzer, ReloadOutcome};
pub use attribution::{clean_word, explain, LexiconBands, ModelScorer, WordAttributor, WordScorer};
pub use classify::{classify, classify_batch};
pub use registry::{ModelRegistry, ModelState, ModelStatus};
