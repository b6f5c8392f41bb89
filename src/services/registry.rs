//! Process-wide handle to the active model.
//!
//! The registry owns at most one [`Pipeline`]. It is loaded lazily on first
//! use and replaced only by [`ModelRegistry::reload`], which builds the new
//! pipeline before swapping it in. Readers clone an `Arc` under a short read
//! lock and never see a half-replaced model.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{artifact, Pipeline};

/// Whether a model is ready to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// A pipeline is loaded.
    Ready,
    /// Nothing has been loaded yet, or every load attempt failed.
    NotLoaded,
}

/// Snapshot of the registry for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    /// Whether a pipeline is loaded.
    pub loaded: bool,
    /// Ready or not loaded.
    pub state: ModelState,
    /// Artifact location.
    pub model_path: PathBuf,
    /// Whether the artifact exists on disk.
    pub artifact_exists: bool,
    /// Artifact size in bytes, when it exists.
    pub artifact_size: Option<u64>,
    /// Vocabulary size of the loaded pipeline.
    pub vocabulary_size: Option<usize>,
    /// When the loaded pipeline was trained.
    pub trained_at: Option<DateTime<Utc>>,
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Owner of the single active pipeline.
#[derive(Debug)]
pub struct ModelRegistry {
    path: PathBuf,
    current: RwLock<Option<Arc<Pipeline>>>,
}

impl ModelRegistry {
    /// Registry that loads from `path` on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), current: RwLock::new(None) }
    }

    /// Registry with `pipeline` already active. Reloads still read `path`.
    pub fn with_pipeline(path: impl Into<PathBuf>, pipeline: Pipeline) -> Self {
        Self { path: path.into(), current: RwLock::new(Some(Arc::new(pipeline))) }
    }

    /// Artifact location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a pipeline is active.
    pub fn is_loaded(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// The active pipeline, loading it from disk if none is active yet.
    pub fn get(&self) -> Result<Arc<Pipeline>> {
        if let Some(pipeline) = self.current.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(Arc::clone(pipeline));
        }

        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded while we waited for the write lock
        if let Some(pipeline) = slot.as_ref() {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = artifact::load(&self.path).map_err(|e| {
            tracing::warn!("Model load from {} failed: {e}", self.path.display());
            Error::unavailable(e.to_string())
        })?;
        let pipeline = Arc::new(pipeline);
        *slot = Some(Arc::clone(&pipeline));
        Ok(pipeline)
    }

    /// Load the artifact again and swap it in.
    ///
    /// On failure the previously active pipeline, if any, stays active.
    pub fn reload(&self) -> Result<Arc<Pipeline>> {
        let pipeline = match artifact::load(&self.path) {
            Ok(pipeline) => Arc::new(pipeline),
            Err(e) => {
                tracing::warn!("Reload failed, keeping current model: {e}");
                return Err(e);
            }
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&pipeline));
        tracing::info!("Model reloaded from {}", self.path.display());
        Ok(pipeline)
    }

    /// Current state, without triggering a load.
    pub fn status(&self) -> ModelStatus {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner).clone();
        let metadata = fs_err::metadata(&self.path).ok();

        ModelStatus {
            loaded: current.is_some(),
            state: if current.is_some() { ModelState::Ready } else { ModelState::NotLoaded },
            model_path: self.path.clone(),
            artifact_exists: metadata.is_some(),
            artifact_size: metadata.map(|m| m.len()),
            vocabulary_size: current.as_ref().map(|p| p.vocabulary_size()),
            trained_at: current.as_ref().map(|p| p.training().trained_at),
            timestamp: Utc::now(),
        }
    }
}
