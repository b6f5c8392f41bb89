//! Core result types shared by classification and attribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::attribution::{HIGH_TIER_THRESHOLD, MEDIUM_TIER_THRESHOLD};

/// Binary classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionClass {
    /// Clean lyrics.
    #[default]
    NotExplicit,
    /// Lyrics with profane or adult content.
    Explicit,
}

impl PredictionClass {
    /// Both classes in model column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::NotExplicit, Self::Explicit]
    }

    /// Column index used by the classifier (0 = not explicit, 1 = explicit).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::NotExplicit => 0,
            Self::Explicit => 1,
        }
    }

    /// Machine-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotExplicit => "not_explicit",
            Self::Explicit => "explicit",
        }
    }
}

impl From<bool> for PredictionClass {
    fn from(is_explicit: bool) -> Self {
        if is_explicit {
            Self::Explicit
        } else {
            Self::NotExplicit
        }
    }
}

impl fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Class probabilities for one prediction; the pair sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// P(not explicit).
    pub not_explicit: f64,
    /// P(explicit).
    pub explicit: f64,
}

impl ClassProbabilities {
    /// Build from a `[not_explicit, explicit]` pair.
    #[must_use]
    pub const fn from_pair(pair: [f64; 2]) -> Self {
        Self { not_explicit: pair[0], explicit: pair[1] }
    }

    /// Probability of `class`.
    #[must_use]
    pub const fn get(&self, class: PredictionClass) -> f64 {
        match class {
            PredictionClass::NotExplicit => self.not_explicit,
            PredictionClass::Explicit => self.explicit,
        }
    }

    /// Most likely class. Ties resolve to not explicit.
    #[must_use]
    pub fn most_likely(&self) -> PredictionClass {
        PredictionClass::from(self.explicit > self.not_explicit)
    }

    /// The larger of the two probabilities.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.not_explicit.max(self.explicit)
    }
}

/// Document-level decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the lyrics were classified explicit.
    pub is_explicit: bool,
    /// Probability of the chosen class.
    pub confidence: f64,
    /// Chosen class.
    pub class_label: PredictionClass,
}

impl Verdict {
    /// Verdict implied by a probability pair.
    #[must_use]
    pub fn from_probabilities(probabilities: &ClassProbabilities) -> Self {
        let class_label = probabilities.most_likely();
        Self {
            is_explicit: class_label == PredictionClass::Explicit,
            confidence: probabilities.max(),
            class_label,
        }
    }
}

/// Coarse description of verdict confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// At least 0.9.
    VeryHigh,
    /// At least 0.8.
    High,
    /// At least 0.7.
    Moderate,
    /// At least 0.6.
    Low,
    /// Below 0.6.
    VeryLow,
}

impl ConfidenceLevel {
    /// Bucket a confidence value.
    #[must_use]
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::VeryHigh
        } else if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.7 {
            Self::Moderate
        } else if confidence >= 0.6 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very confident",
            Self::High => "Fairly confident",
            Self::Moderate => "Moderately confident",
            Self::Low => "Slightly confident",
            Self::VeryLow => "Very uncertain",
        }
    }
}

/// How strongly a word drove an explicit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTier {
    /// Score at or below 0.6.
    Low,
    /// Score above 0.6 and at most 0.8.
    Medium,
    /// Score above 0.8.
    High,
}

impl ContributionTier {
    /// Tier for an explicitness score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_TIER_THRESHOLD {
            Self::High
        } else if score > MEDIUM_TIER_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Which stage produced a word's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Classifier probability for the word as its own document.
    Model,
    /// Classifier scored a lexicon term too low and the lexicon raised it.
    LexiconOverride,
    /// Classifier could not score the word; lexicon band used instead.
    Fallback,
}

/// Per-word explicitness attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    /// Surface form as it appeared in the lyrics.
    pub word: String,
    /// Lowercased form with surrounding punctuation trimmed.
    pub word_cleaned: String,
    /// Explicitness score in `[0, 1]`.
    pub explicit_score: f64,
    /// Whether the word is flagged explicit.
    pub is_explicit: bool,
    /// Contribution bucket.
    pub contribution_tier: ContributionTier,
    /// Whether the cleaned word is a lexicon term.
    pub is_lexicon_hit: bool,
    /// Stage that produced `explicit_score`.
    pub source: ScoreSource,
}

/// Optional song context carried through to responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfo {
    /// Song title.
    pub title: Option<String>,
    /// Performing artist.
    pub artist: Option<String>,
}

impl SongInfo {
    /// Song context from optional title and artist.
    pub fn new(title: Option<&str>, artist: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            artist: artist.map(str::to_string),
        }
    }
}

/// Response metadata for a classified lyrics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsMetadata {
    /// Characters in the raw lyrics.
    pub lyrics_length: usize,
    /// Whitespace-separated words in the raw lyrics.
    pub word_count: usize,
    /// When the response was produced.
    pub timestamp: DateTime<Utc>,
    /// Song context, not used for classification.
    #[serde(flatten)]
    pub song: SongInfo,
}

impl LyricsMetadata {
    /// Metadata for `lyrics`, stamped now.
    pub fn describe(lyrics: &str, song: &SongInfo) -> Self {
        Self {
            lyrics_length: lyrics.chars().count(),
            word_count: lyrics.split_whitespace().count(),
            timestamp: Utc::now(),
            song: song.clone(),
        }
    }
}

/// Result of classifying a full lyrics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Document-level decision.
    pub verdict: Verdict,
    /// Class probabilities behind the verdict.
    pub probabilities: ClassProbabilities,
    /// Bucketed confidence.
    pub confidence_level: ConfidenceLevel,
    /// Response context.
    pub metadata: LyricsMetadata,
}

/// Word counts reported with an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplanationCounts {
    /// Whitespace-separated words in the lyrics.
    pub total_words: usize,
    /// Words long enough to be scored.
    pub analyzed_words: usize,
    /// Scored words flagged explicit.
    pub explicit_words: usize,
    /// `explicit_words` as a percentage of `analyzed_words`.
    pub explicit_percentage: f64,
}

/// Per-word explanation of a document-level classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Scored words in input order.
    pub words: Vec<WordScore>,
    /// Whole-document classification, computed independently of `words`.
    pub overall: Classification,
    /// Word counts.
    pub counts: ExplanationCounts,
}

/// Outcome for one item of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// The item was classified.
    Classified {
        /// Document-level decision.
        verdict: Verdict,
        /// Class probabilities behind the verdict.
        probabilities: ClassProbabilities,
    },
    /// The item was not classified.
    Rejected {
        /// Why the item was skipped.
        reason: String,
    },
}

/// One batch result, tagged with its input position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position in the request.
    pub index: usize,
    /// What happened to the item.
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    /// The verdict, if the item was classified.
    pub const fn verdict(&self) -> Option<&Verdict> {
        match &self.outcome {
            BatchOutcome::Classified { verdict, .. } => Some(verdict),
            BatchOutcome::Rejected { .. } => None,
        }
    }
}
