//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::constants::artifact::DEFAULT_MODEL_PATH;
use crate::constants::batch::MAX_BATCH_SIZE;
use crate::error::{Error, Result};

/// Default training dataset location.
pub const DEFAULT_DATASET_PATH: &str = "data/spotify_dataset.csv";

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the model artifact
    pub model_path: PathBuf,
    /// Location of the labeled training CSV
    pub dataset_path: PathBuf,
    /// Maximum lyrics documents per batch request
    pub max_batch_size: usize,
    /// Optional newline-delimited file of extra lexicon terms
    pub lexicon_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            max_batch_size: MAX_BATCH_SIZE,
            lexicon_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("LYRICSCAN_MODEL_PATH") {
            config.model_path = expand_path(&path);
        }

        if let Some(path) = lookup("LYRICSCAN_DATASET_PATH") {
            config.dataset_path = expand_path(&path);
        }

        // Unlike paths, a bad batch size is an error rather than a silent default
        if let Some(size) = lookup("LYRICSCAN_MAX_BATCH_SIZE") {
            config.max_batch_size = match size.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::config(
                        format!("invalid LYRICSCAN_MAX_BATCH_SIZE '{size}'"),
                        "Set LYRICSCAN_MAX_BATCH_SIZE to a positive integer",
                    ))
                }
            };
        }

        config.lexicon_path = lookup("LYRICSCAN_LEXICON_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_path(&p));

        Ok(config)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.max_batch_size, 100);
        assert!(config.lexicon_path.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = from_pairs(&[
            ("LYRICSCAN_MODEL_PATH", "/srv/models/m.json.gz"),
            ("LYRICSCAN_MAX_BATCH_SIZE", "25"),
            ("LYRICSCAN_LEXICON_PATH", "/etc/lyricscan/terms.txt"),
        ])
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/models/m.json.gz"));
        assert_eq!(config.max_batch_size, 25);
        assert_eq!(config.lexicon_path, Some(PathBuf::from("/etc/lyricscan/terms.txt")));
    }

    #[test]
    fn bad_batch_size_is_config_error() {
        for value in ["zero", "0", "-3"] {
            let err = from_pairs(&[("LYRICSCAN_MAX_BATCH_SIZE", value)]).unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
        }
    }
}
