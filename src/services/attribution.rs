//! Per-word explicitness attribution.
//!
//! Each surface word is scored in two stages. The primary [`WordScorer`] asks
//! the model to classify the word as its own document. When that fails the
//! lexicon bands supply a fixed score instead, and the result is tagged
//! [`ScoreSource::Fallback`] so it is never mistaken for a model score.
//! Lexicon terms the model scores too low are raised and tagged
//! [`ScoreSource::LexiconOverride`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::classify::classify;
use crate::constants::attribution::{
    FALLBACK_LEXICON_HIT, FALLBACK_LEXICON_MISS, LEXICON_OVERRIDE_FLOOR, LEXICON_OVERRIDE_SCORE,
    MAX_SKIPPED_WORD_LEN, MEDIUM_TIER_THRESHOLD, TRIM_CHARS,
};
use crate::error::Result;
use crate::lexicon::ExplicitLexicon;
use crate::model::Pipeline;
use crate::types::{
    ContributionTier, Explanation, ExplanationCounts, PredictionClass, ScoreSource, SongInfo, WordScore,
};

/// Regex matching one surface word.
#[allow(clippy::expect_used)]
static RE_SURFACE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S+").expect("valid regex: RE_SURFACE_WORD")
});

/// Primary scoring stage for a single cleaned word.
///
/// Implementations return the probability that the word is explicit, or an
/// error when they cannot score it.
pub trait WordScorer: Send + Sync {
    /// Explicitness of `word_cleaned` in `[0, 1]`.
    fn score(&self, word_cleaned: &str) -> Result<f64>;

    /// Name of this scorer, for logging.
    fn name(&self) -> &'static str;
}

/// Scores a word by classifying it as a one-word document.
#[derive(Debug, Clone, Copy)]
pub struct ModelScorer<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> ModelScorer<'a> {
    /// Scorer backed by `pipeline`.
    pub const fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }
}

impl WordScorer for ModelScorer<'_> {
    fn score(&self, word_cleaned: &str) -> Result<f64> {
        Ok(self
            .pipeline
            .predict_proba_informative(word_cleaned)?
            .get(PredictionClass::Explicit))
    }

    fn name(&self) -> &'static str {
        "ModelScorer"
    }
}

/// Fixed scores used when the primary scorer fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconBands {
    /// Score for a lexicon term.
    pub hit: f64,
    /// Score for any other word.
    pub miss: f64,
}

impl Default for LexiconBands {
    fn default() -> Self {
        Self { hit: FALLBACK_LEXICON_HIT, miss: FALLBACK_LEXICON_MISS }
    }
}

impl LexiconBands {
    /// Band for a word with the given lexicon membership.
    pub const fn score(&self, is_lexicon_hit: bool) -> f64 {
        if is_lexicon_hit {
            self.hit
        } else {
            self.miss
        }
    }
}

/// Lowercase `word` and trim surrounding punctuation.
pub fn clean_word(word: &str) -> String {
    word.to_lowercase().trim_matches(TRIM_CHARS).to_string()
}

/// Scores the words of a lyrics document.
///
/// The document verdict always comes from the attributor's own pipeline.
#[derive(Debug, Clone)]
pub struct WordAttributor<'a, S = ModelScorer<'a>> {
    pipeline: &'a Pipeline,
    scorer: S,
    lexicon: &'a ExplicitLexicon,
    bands: LexiconBands,
}

impl<'a> WordAttributor<'a> {
    /// Attributor scoring words with `pipeline`.
    pub fn new(pipeline: &'a Pipeline, lexicon: &'a ExplicitLexicon) -> Self {
        Self::with_scorer(pipeline, ModelScorer::new(pipeline), lexicon)
    }
}

impl<'a, S: WordScorer> WordAttributor<'a, S> {
    /// Attributor with a custom primary word scorer over `pipeline`.
    pub fn with_scorer(pipeline: &'a Pipeline, scorer: S, lexicon: &'a ExplicitLexicon) -> Self {
        Self { pipeline, scorer, lexicon, bands: LexiconBands::default() }
    }

    /// Replace the fallback bands.
    #[must_use]
    pub fn with_bands(mut self, bands: LexiconBands) -> Self {
        self.bands = bands;
        self
    }

    /// Score one surface word, or `None` if it is too short to score.
    pub fn score_word(&self, word: &str) -> Option<WordScore> {
        let word_cleaned = clean_word(word);
        if word_cleaned.chars().count() <= MAX_SKIPPED_WORD_LEN {
            return None;
        }
        let is_lexicon_hit = self.lexicon.contains(&word_cleaned);

        let (mut explicit_score, mut source) = match self.scorer.score(&word_cleaned) {
            Ok(score) => (score, ScoreSource::Model),
            Err(e) => {
                tracing::debug!(
                    "{} could not score '{word_cleaned}', using lexicon fallback: {e}",
                    self.scorer.name()
                );
                (self.bands.score(is_lexicon_hit), ScoreSource::Fallback)
            }
        };

        if is_lexicon_hit && explicit_score < LEXICON_OVERRIDE_FLOOR {
            explicit_score = LEXICON_OVERRIDE_SCORE;
            source = ScoreSource::LexiconOverride;
        }

        Some(WordScore {
            word: word.to_string(),
            word_cleaned,
            explicit_score,
            is_explicit: explicit_score > MEDIUM_TIER_THRESHOLD || is_lexicon_hit,
            contribution_tier: ContributionTier::from_score(explicit_score),
            is_lexicon_hit,
            source,
        })
    }

    /// Score every whitespace-separated word of `lyrics`, in order.
    pub fn score_words(&self, lyrics: &str) -> Vec<WordScore> {
        lyrics.split_whitespace().filter_map(|w| self.score_word(w)).collect()
    }

    /// Score the words of `lyrics` and attach the document classification.
    ///
    /// The document verdict comes from the whole text and may disagree with
    /// the word scores.
    pub fn explain(&self, lyrics: &str, song: &SongInfo) -> Result<Explanation> {
        let overall = classify(self.pipeline, lyrics, song)?;
        let words = self.score_words(lyrics);

        let analyzed_words = words.len();
        let explicit_words = words.iter().filter(|w| w.is_explicit).count();
        let counts = ExplanationCounts {
            total_words: lyrics.split_whitespace().count(),
            analyzed_words,
            explicit_words,
            explicit_percentage: if analyzed_words == 0 {
                0.0
            } else {
                explicit_words as f64 / analyzed_words as f64 * 100.0
            },
        };

        tracing::info!("Explained {analyzed_words} words, {explicit_words} flagged explicit");
        Ok(Explanation { words, overall, counts })
    }
}

/// Explain `lyrics` with the model-backed attributor.
pub fn explain(
    pipeline: &Pipeline,
    lexicon: &ExplicitLexicon,
    lyrics: &str,
    song: &SongInfo,
) -> Result<Explanation> {
    WordAttributor::new(pipeline, lexicon).explain(lyrics, song)
}

impl Explanation {
    /// Surface forms of the flagged words, in lyrics order.
    pub fn explicit_words(&self) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| w.is_explicit)
            .map(|w| w.word.as_str())
            .collect()
    }

    /// `lyrics` with every flagged word wrapped in `open`/`close`.
    ///
    /// Words are matched by their cleaned form, so every occurrence of a
    /// flagged word is marked. Whitespace is preserved.
    pub fn highlight(&self, lyrics: &str, open: &str, close: &str) -> String {
        let flagged: HashSet<&str> = self
            .words
            .iter()
            .filter(|w| w.is_explicit)
            .map(|w| w.word_cleaned.as_str())
            .collect();

        RE_SURFACE_WORD
            .replace_all(lyrics, |caps: &Captures<'_>| {
                let word = &caps[0];
                if flagged.contains(clean_word(word).as_str()) {
                    format!("{open}{word}{close}")
                } else {
                    word.to_string()
                }
            })
            .into_owned()
    }
}
