//! Entry point used by front ends.
//!
//! [`LyricsAnalyzer`] ties the model registry, the lexicon and the request
//! limits together. It is cheap to clone and safe to share across threads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attribution::WordAttributor;
use super::classify::{check_batch_size, classify, classify_batch};
use super::registry::{ModelRegistry, ModelStatus};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lexicon::ExplicitLexicon;
use crate::types::{BatchItem, Classification, Explanation, SongInfo};

/// Result of an operator-triggered reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadOutcome {
    /// Whether the new model is now active.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
    /// When the reload was attempted.
    pub timestamp: DateTime<Utc>,
}

/// Classification and explanation over a shared model.
#[derive(Debug, Clone)]
pub struct LyricsAnalyzer {
    registry: Arc<ModelRegistry>,
    lexicon: Arc<ExplicitLexicon>,
    max_batch_size: usize,
}

impl LyricsAnalyzer {
    /// Analyzer over an existing registry and lexicon.
    pub const fn new(registry: Arc<ModelRegistry>, lexicon: Arc<ExplicitLexicon>, max_batch_size: usize) -> Self {
        Self { registry, lexicon, max_batch_size }
    }

    /// Analyzer configured from `config`. The model itself loads on first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => ExplicitLexicon::from_file(path)?,
            None => ExplicitLexicon::builtin().clone(),
        };
        Ok(Self::new(
            Arc::new(ModelRegistry::new(&config.model_path)),
            Arc::new(lexicon),
            config.max_batch_size,
        ))
    }

    /// The model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The lexicon.
    pub fn lexicon(&self) -> &ExplicitLexicon {
        &self.lexicon
    }

    /// Largest accepted batch.
    pub const fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Classify a full lyrics document.
    pub fn classify(&self, lyrics: &str, song: &SongInfo) -> Result<Classification> {
        if lyrics.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let pipeline = self.registry.get()?;
        classify(&pipeline, lyrics, song)
    }

    /// Classify a lyrics document and score its words.
    pub fn explain(&self, lyrics: &str, song: &SongInfo) -> Result<Explanation> {
        if lyrics.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let pipeline = self.registry.get()?;
        WordAttributor::new(&pipeline, &self.lexicon).explain(lyrics, song)
    }

    /// Classify up to [`max_batch_size`](Self::max_batch_size) documents.
    pub fn predict_batch<S>(&self, texts: &[S]) -> Result<Vec<BatchItem>>
    where
        S: AsRef<str> + Sync,
    {
        check_batch_size(texts.len(), self.max_batch_size)?;
        let pipeline = self.registry.get()?;
        classify_batch(&pipeline, texts, self.max_batch_size)
    }

    /// Reload the model from disk, keeping the current one on failure.
    pub fn reload(&self) -> ReloadOutcome {
        let (success, message) = match self.registry.reload() {
            Ok(pipeline) => (
                true,
                format!("Model reloaded ({} terms)", pipeline.vocabulary_size()),
            ),
            Err(e) => (false, format!("Reload failed: {e}")),
        };
        ReloadOutcome { success, message, timestamp: Utc::now() }
    }

    /// Current model state.
    pub fn status(&self) -> ModelStatus {
        self.registry.status()
    }
}
