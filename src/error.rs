//! Crate error types.
//!
//! Provides unified error handling with actionable context for debugging.

use std::path::PathBuf;

use thiserror::Error;

/// Crate result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// No usable model: artifact missing, corrupt, or never loaded.
    #[error("Model unavailable: {reason}")]
    ModelUnavailable {
        /// Why the model could not be obtained.
        reason: String,
    },

    /// A pipeline stage was used before it was fit.
    #[error("Model stage '{stage}' has not been trained")]
    ModelNotTrained {
        /// Name of the unfitted stage.
        stage: &'static str,
    },

    /// Lyrics were empty or whitespace-only.
    #[error("Lyrics cannot be empty")]
    EmptyInput,

    /// A batch request carried no items.
    #[error("Batch is empty: supply at least one lyrics document")]
    EmptyBatch,

    /// A batch request exceeded the configured cap.
    #[error("Batch of {size} items exceeds the maximum of {max} per request")]
    BatchTooLarge {
        /// Number of items submitted.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Artifact bytes could not be decoded or its stages disagree.
    #[error("Corrupt model artifact at {path:?}: {message}")]
    CorruptArtifact {
        /// Artifact location, if known.
        path: Option<PathBuf>,
        /// Description of the inconsistency.
        message: String,
    },

    /// Artifact was written by an incompatible format version.
    #[error("Incompatible model artifact: found format {found}, expected {expected}")]
    IncompatibleArtifact {
        /// Version tag found in the artifact.
        found: String,
        /// Version tag this build understands.
        expected: String,
    },

    /// Text produced a feature vector with no known terms.
    #[error("No in-vocabulary features for {text:?}")]
    DegenerateFeatures {
        /// The text that was vectorized.
        text: String,
    },

    /// Training data problem
    #[error("Dataset error: {message}")]
    Dataset {
        /// Description of the problem.
        message: String,
    },

    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<PathBuf>,
    },

    /// File parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a model-unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable { reason: reason.into() }
    }

    /// Create a corrupt-artifact error with optional path context
    pub fn corrupt(message: impl Into<String>, path: impl Into<Option<PathBuf>>) -> Self {
        Self::CorruptArtifact { path: path.into(), message: message.into() }
    }

    /// Create a dataset error
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset { message: message.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Whether the caller can recover by reloading the model.
    pub const fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. }
                | Self::CorruptArtifact { .. }
                | Self::IncompatibleArtifact { .. }
        )
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(csv::Position::line);
        Self::Parse {
            file: None,
            message: line.map_or_else(|| e.to_string(), |l| format!("line {l}: {e}")),
        }
    }
}
