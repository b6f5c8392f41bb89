//! Crate constants.
//!
//! Centralizes thresholds, score bands and training hyper-parameters.

/// Per-word attribution thresholds and score bands.
pub mod attribution {
    /// Cleaned words of this length or shorter are not scored.
    pub const MAX_SKIPPED_WORD_LEN: usize = 2;

    /// Scores strictly above this are in the high tier.
    pub const HIGH_TIER_THRESHOLD: f64 = 0.8;

    /// Scores strictly above this are in the medium tier and flagged explicit.
    pub const MEDIUM_TIER_THRESHOLD: f64 = 0.6;

    /// A lexicon hit whose model score falls below this is raised.
    pub const LEXICON_OVERRIDE_FLOOR: f64 = 0.7;

    /// Score assigned when the lexicon overrides a low model score.
    pub const LEXICON_OVERRIDE_SCORE: f64 = 0.85;

    /// Fallback score for a lexicon hit the model could not score.
    pub const FALLBACK_LEXICON_HIT: f64 = 0.85;

    /// Fallback score for an ordinary word the model could not score.
    pub const FALLBACK_LEXICON_MISS: f64 = 0.2;

    /// Characters trimmed from both ends of a surface word.
    pub const TRIM_CHARS: &[char] = &['.', ',', '!', '?', '"', ';', ':', '(', ')', '[', ']', '{', '}'];
}

/// Normalizer configuration.
pub mod normalizer {
    /// Tokens of this length or shorter are dropped.
    pub const MAX_DROPPED_TOKEN_LEN: usize = 1;

    /// Stopword language tag recorded in artifacts.
    pub const LANGUAGE: &str = "english";

    /// Stemmer identifier recorded in artifacts.
    pub const STEMMER: &str = "snowball-english";
}

/// Vectorizer and classifier hyper-parameters.
pub mod training {
    /// Maximum vocabulary size kept after document-frequency pruning.
    pub const MAX_FEATURES: usize = 10_000;

    /// Terms must appear in at least this many documents.
    pub const MIN_DF: usize = 2;

    /// Terms appearing in more than this fraction of documents are dropped.
    pub const MAX_DF: f64 = 0.95;

    /// Largest n-gram length (unigrams and bigrams).
    pub const MAX_NGRAM: usize = 2;

    /// Additive smoothing for the naive Bayes classifier.
    pub const ALPHA: f64 = 0.1;

    /// Fraction of labeled data held out for evaluation.
    pub const TEST_FRACTION: f64 = 0.2;

    /// Seed for the stratified split.
    pub const SPLIT_SEED: u64 = 42;

    /// Samples whose cleaned text is this long or shorter are dropped.
    pub const MIN_CLEAN_CHARS: usize = 10;

    /// Default dataset text column.
    pub const TEXT_COLUMN: &str = "text";

    /// Default dataset label column.
    pub const LABEL_COLUMN: &str = "Explicit";
}

/// Dataset cleaning defaults.
pub mod dataset {
    /// Minimum cleaned word count for a usable sample.
    pub const MIN_WORDS: usize = 5;

    /// Maximum cleaned word count for a usable sample.
    pub const MAX_WORDS: usize = 1000;

    /// Jaccard similarity at or above which two samples are duplicates.
    pub const DUPLICATE_THRESHOLD: f64 = 0.8;
}

/// Request limits.
pub mod batch {
    /// Default maximum number of lyrics documents per batch request.
    pub const MAX_BATCH_SIZE: usize = 100;
}

/// Artifact format.
pub mod artifact {
    /// Format identifier embedded in every artifact.
    pub const FORMAT: &str = "lyricscan-pipeline";

    /// Format version this build reads and writes.
    pub const VERSION: u32 = 1;

    /// Default artifact location.
    pub const DEFAULT_MODEL_PATH: &str = "saved_models/explicit_lyrics_classifier.json.gz";
}
