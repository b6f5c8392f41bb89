//! Curated explicit-term lexicon.
//!
//! The built-in set is process-wide and immutable. Deployments may extend it
//! once at start-up from a newline-delimited file; the resulting
//! [`ExplicitLexicon`] is then shared read-only.

use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;

use crate::error::{Error, Result};

const BUILTIN_TERMS: &[&str] = &[
    "fuck", "shit", "bitch", "damn", "hell", "ass", "bastard", "cock", "dick", "pussy", "whore",
    "slut", "motherfucker", "fucking", "fucked", "nigga", "nigger", "cunt", "faggot",
];

lazy_static! {
    static ref BUILTIN: ExplicitLexicon = ExplicitLexicon {
        terms: BUILTIN_TERMS.iter().map(|t| (*t).to_string()).collect(),
    };
}

/// A fixed set of lowercase explicit terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitLexicon {
    terms: HashSet<String>,
}

impl ExplicitLexicon {
    /// The built-in lexicon shared by the whole process.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Built-in terms plus `extra`, lowercased and trimmed.
    pub fn with_extra_terms<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms = BUILTIN.terms.clone();
        terms.extend(
            extra
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        Self { terms }
    }

    /// Built-in terms plus one term per line of `path`.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
        let extra = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));
        let lexicon = Self::with_extra_terms(extra);

        tracing::info!(
            "Loaded lexicon with {} terms ({} built-in) from {}",
            lexicon.len(),
            BUILTIN_TERMS.len(),
            path.display()
        );
        Ok(lexicon)
    }

    /// Whether the already-lowercased `word` is a lexicon term.
    pub fn contains(&self, word: &str) -> bool {
        self.terms.contains(word)
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the lexicon has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for ExplicitLexicon {
    fn default() -> Self {
        BUILTIN.clone()
    }
}
