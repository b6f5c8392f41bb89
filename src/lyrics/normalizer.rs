//! Deterministic lyrics cleaning for vectorization.
//!
//! Lowercases, strips URLs, mentions, hashtags and emails, keeps only letters,
//! drops stopwords and single letters, and stems what remains.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::language;
use crate::constants::normalizer::{LANGUAGE, MAX_DROPPED_TOKEN_LEN, STEMMER};
use crate::error::{Error, Result};

/// Regex matching `http...`, `https...` and `www...` runs.
#[allow(clippy::expect_used)]
static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http\S+|www\S+|https\S+").expect("valid regex: RE_URL")
});

/// Regex matching `@mentions` and `#hashtags`.
#[allow(clippy::expect_used)]
static RE_HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@\w+|#\w+").expect("valid regex: RE_HANDLE")
});

/// Regex matching email-like tokens.
#[allow(clippy::expect_used)]
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+@\S+").expect("valid regex: RE_EMAIL")
});

/// Regex matching anything except ASCII letters, whitespace and apostrophes.
#[allow(clippy::expect_used)]
static RE_NON_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z\s']").expect("valid regex: RE_NON_LETTER")
});

/// Normalizer settings persisted alongside the trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Stopword language.
    pub language: String,
    /// Stemming algorithm.
    pub stemmer: String,
    /// Tokens of this many characters or fewer are dropped.
    pub max_dropped_token_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            language: LANGUAGE.to_string(),
            stemmer: STEMMER.to_string(),
            max_dropped_token_len: MAX_DROPPED_TOKEN_LEN,
        }
    }
}

/// Lyrics cleaner producing space-joined stems.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    /// Create a normalizer with the default English configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a normalizer from persisted settings.
    ///
    /// Only English stopwords with the Snowball English stemmer are available,
    /// so any other combination is rejected.
    pub fn from_config(config: NormalizerConfig) -> Result<Self> {
        if config.language != LANGUAGE || config.stemmer != STEMMER {
            return Err(Error::corrupt(
                format!(
                    "unsupported normalizer (language={}, stemmer={})",
                    config.language, config.stemmer
                ),
                None,
            ));
        }
        Ok(Self { config })
    }

    /// Settings to persist with a trained pipeline.
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Clean raw lyrics into space-joined stems. Empty input yields `""`.
    pub fn clean(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Clean raw lyrics into an ordered list of stems.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        let without_urls = RE_URL.replace_all(&lowered, "");
        let without_emails = RE_EMAIL.replace_all(&without_urls, "");
        let without_handles = RE_HANDLE.replace_all(&without_emails, "");
        let letters_only = RE_NON_LETTER.replace_all(&without_handles, " ");

        letters_only
            .split_whitespace()
            .flat_map(|chunk| chunk.split('\''))
            .filter(|token| self.keep(token))
            .map(language::stem)
            .filter(|stem| stem.chars().count() > self.config.max_dropped_token_len)
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() > self.config.max_dropped_token_len && !language::is_stopword(token)
    }
}
