//! Whole-document classification.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::Pipeline;
use crate::types::{BatchItem, BatchOutcome, Classification, ConfidenceLevel, LyricsMetadata, SongInfo, Verdict};

/// Classify one lyrics document.
///
/// `song` is carried into the response metadata and does not affect the
/// verdict.
pub fn classify(pipeline: &Pipeline, lyrics: &str, song: &SongInfo) -> Result<Classification> {
    if lyrics.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let probabilities = pipeline.predict_proba_one(lyrics)?;
    let verdict = Verdict::from_probabilities(&probabilities);
    tracing::debug!(
        "Classified {} chars as {} ({:.3})",
        lyrics.len(),
        verdict.class_label,
        verdict.confidence
    );

    Ok(Classification {
        verdict,
        probabilities,
        confidence_level: ConfidenceLevel::from_confidence(verdict.confidence),
        metadata: LyricsMetadata::describe(lyrics, song),
    })
}

/// Validate a batch request's size.
pub fn check_batch_size(size: usize, max: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::EmptyBatch);
    }
    if size > max {
        return Err(Error::BatchTooLarge { size, max });
    }
    Ok(())
}

/// Classify many documents in parallel, one result per input in input order.
///
/// Empty items are rejected individually; only an empty or oversized batch
/// fails as a whole.
pub fn classify_batch<S>(pipeline: &Pipeline, texts: &[S], max: usize) -> Result<Vec<BatchItem>>
where
    S: AsRef<str> + Sync,
{
    check_batch_size(texts.len(), max)?;

    let items = texts
        .par_iter()
        .enumerate()
        .map(|(index, text)| {
            let text = text.as_ref();
            let outcome = if text.trim().is_empty() {
                BatchOutcome::Rejected { reason: Error::EmptyInput.to_string() }
            } else {
                let probabilities = pipeline.predict_proba_one(text)?;
                BatchOutcome::Classified { verdict: Verdict::from_probabilities(&probabilities), probabilities }
            };
            Ok(BatchItem { index, outcome })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Classified batch of {} lyrics", items.len());
    Ok(items)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::model::{train, LabeledLyrics, TrainingConfig};

    fn trained() -> Pipeline {
        let samples = vec![
            LabeledLyrics::new("sunshine flowers happy garden morning", false),
            LabeledLyrics::new("happy garden flowers morning light", false),
            LabeledLyrics::new("damn bitch shit street night", true),
            LabeledLyrics::new("shit damn bitch night money", true),
        ];
        let config = TrainingConfig { test_fraction: 0.0, max_df: 1.0, ..TrainingConfig::default() };
        train(&samples, &config).unwrap().pipeline
    }

    #[test]
    fn empty_lyrics_are_rejected() {
        let pipeline = trained();
        for lyrics in ["", "   ", "\n\t"] {
            assert!(matches!(
                classify(&pipeline, lyrics, &SongInfo::default()),
                Err(Error::EmptyInput)
            ));
        }
    }

    #[test]
    fn carries_song_metadata() {
        let pipeline = trained();
        let song = SongInfo::new(Some("Morning"), Some("The Gardeners"));
        let result = classify(&pipeline, "happy garden in the morning", &song).unwrap();
        assert!(!result.verdict.is_explicit);
        assert_eq!(result.metadata.word_count, 5);
        assert_eq!(result.metadata.song.title.as_deref(), Some("Morning"));
    }

    #[test]
    fn batch_size_limits() {
        assert!(matches!(check_batch_size(0, 100), Err(Error::EmptyBatch)));
        assert!(matches!(
            check_batch_size(101, 100),
            Err(Error::BatchTooLarge { size: 101, max: 100 })
        ));
        assert!(check_batch_size(100, 100).is_ok());
    }

    #[test]
    fn batch_rejects_empty_items_individually() {
        let pipeline = trained();
        let items = classify_batch(&pipeline, &["damn night", " ", "happy garden"], 100).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].verdict().unwrap().is_explicit);
        assert!(matches!(items[1].outcome, BatchOutcome::Rejected { .. }));
        assert!(!items[2].verdict().unwrap().is_explicit);
        assert_eq!(items.iter().map(|i| i.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
