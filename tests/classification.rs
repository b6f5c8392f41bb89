//! End-to-end classification, explanation, batch and reload behavior.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use lyricscan::lexicon::ExplicitLexicon;
use lyricscan::model::{artifact, train, LabeledLyrics, Pipeline, TrainingConfig};
use lyricscan::services::{LyricsAnalyzer, ModelRegistry, ModelState};
use lyricscan::types::{BatchOutcome, ContributionTier, PredictionClass, ScoreSource, SongInfo};
use lyricscan::Error;

const CLEAN: &[&str] = &[
    "I love you baby and I always will, you are my sunshine",
    "Walking by the river in the morning light with you",
    "Your love is like the summer sun shining on my heart",
    "We dance all night under the stars, my love, my heart",
    "Sweet dreams of you fill my heart every single night",
    "The flowers bloom in spring and I think of your smile",
    "Hold my hand and walk with me down this country road",
    "Sunshine on my shoulders makes me happy, love is here",
];

const EXPLICIT: &[&str] = &[
    "Fuck that bitch, I got money on my mind all night",
    "This shit is crazy, damn, we fucking up the club",
    "Motherfucker talking shit, I ain't got time for that",
    "Bitch please, I'm the boss, fuck your money and your car",
    "Damn, shit got real, fucking gun in the street tonight",
    "Ass shaking in the club, bitch I'm fucked up tonight",
    "Fuck the police, shit, we run these streets all night",
    "Damn bitch you fine, let's get fucked up in the club",
];

fn trained_pipeline() -> Pipeline {
    let samples: Vec<LabeledLyrics> = CLEAN
        .iter()
        .map(|t| LabeledLyrics::new(*t, false))
        .chain(EXPLICIT.iter().map(|t| LabeledLyrics::new(*t, true)))
        .collect();
    train(&samples, &TrainingConfig::default()).unwrap().pipeline
}

fn smaller_pipeline() -> Pipeline {
    let samples: Vec<LabeledLyrics> = CLEAN[..6]
        .iter()
        .map(|t| LabeledLyrics::new(*t, false))
        .chain(EXPLICIT[2..].iter().map(|t| LabeledLyrics::new(*t, true)))
        .collect();
    train(&samples, &TrainingConfig::default()).unwrap().pipeline
}

fn analyzer_at(path: &Path) -> LyricsAnalyzer {
    artifact::save(&trained_pipeline(), path).unwrap();
    LyricsAnalyzer::new(
        Arc::new(ModelRegistry::new(path)),
        Arc::new(ExplicitLexicon::builtin().clone()),
        100,
    )
}

fn sample_inputs() -> Vec<&'static str> {
    let mut inputs: Vec<&str> = CLEAN.iter().chain(EXPLICIT).copied().collect();
    inputs.extend(["zebra quantum", "!!!", "a", "Damn", "http://example.com", "love love love"]);
    inputs
}

#[test]
fn probabilities_are_consistent_with_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    for lyrics in sample_inputs() {
        let result = analyzer.classify(lyrics, &SongInfo::default()).unwrap();
        let p = result.probabilities;
        assert!((p.explicit + p.not_explicit - 1.0).abs() < 1e-9, "{lyrics}");
        assert!((result.verdict.confidence - p.explicit.max(p.not_explicit)).abs() < 1e-12);
        assert_eq!(result.verdict.is_explicit, p.explicit > p.not_explicit, "{lyrics}");
        assert_eq!(
            result.verdict.class_label,
            PredictionClass::from(result.verdict.is_explicit)
        );
    }
}

#[test]
fn empty_lyrics_fail_before_model_load() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = LyricsAnalyzer::new(
        Arc::new(ModelRegistry::new(dir.path().join("missing.json.gz"))),
        Arc::new(ExplicitLexicon::default()),
        100,
    );
    assert!(matches!(analyzer.classify("", &SongInfo::default()), Err(Error::EmptyInput)));
    assert!(matches!(analyzer.classify("   ", &SongInfo::default()), Err(Error::EmptyInput)));
    assert!(matches!(analyzer.explain(" \n ", &SongInfo::default()), Err(Error::EmptyInput)));
}

#[test]
fn missing_model_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = LyricsAnalyzer::new(
        Arc::new(ModelRegistry::new(dir.path().join("missing.json.gz"))),
        Arc::new(ExplicitLexicon::default()),
        100,
    );
    let err = analyzer.classify("some lyrics here", &SongInfo::default()).unwrap_err();
    assert!(err.is_model_unavailable());
    assert!(analyzer.explain("some lyrics here", &SongInfo::default()).is_err());
    assert_eq!(analyzer.status().state, ModelState::NotLoaded);
}

#[test]
fn classification_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));
    let lyrics = "Damn, walking by the river tonight";

    let first = analyzer.classify(lyrics, &SongInfo::default()).unwrap();
    let second = analyzer.classify(lyrics, &SongInfo::default()).unwrap();
    assert_eq!(first.verdict, second.verdict);
    assert_eq!(first.probabilities, second.probabilities);
}

#[test]
fn gentle_lyrics_are_clean() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let result = analyzer
        .classify("I love you more than words can say", &SongInfo::default())
        .unwrap();
    assert!(!result.verdict.is_explicit);
    assert!(result.verdict.confidence >= 0.5);
}

#[test]
fn profane_lyrics_are_explicit() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let result = analyzer
        .classify("fuck this shit bitch", &SongInfo::new(Some("Untitled"), None))
        .unwrap();
    assert!(result.verdict.is_explicit);
    assert_eq!(result.metadata.song.title.as_deref(), Some("Untitled"));
}

#[test]
fn lexicon_words_are_flagged_in_explanations() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let explanation = analyzer.explain("This damn song is great", &SongInfo::default()).unwrap();
    let damn = explanation.words.iter().find(|w| w.word_cleaned == "damn").unwrap();
    assert!(damn.is_explicit);
    assert!(damn.is_lexicon_hit);
    assert!(matches!(
        damn.contribution_tier,
        ContributionTier::Medium | ContributionTier::High
    ));
    assert_eq!(explanation.explicit_words(), vec!["damn"]);

    // Every lexicon term is explicit whatever the model says about it
    for term in ["hell", "bastard", "whore"] {
        let lyrics = format!("walking with {term} tonight");
        let explanation = analyzer.explain(&lyrics, &SongInfo::default()).unwrap();
        let word = explanation.words.iter().find(|w| w.word_cleaned == term).unwrap();
        assert!(word.is_explicit, "{term}");
    }
}

#[test]
fn explanation_preserves_word_order() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let lyrics = "Oh, my sunshine! We go dancing, damn it, all night";
    let explanation = analyzer.explain(lyrics, &SongInfo::default()).unwrap();
    let words: Vec<&str> = explanation.words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(words, vec!["sunshine!", "dancing,", "damn", "all", "night"]);
    assert_eq!(explanation.counts.total_words, 10);
    assert_eq!(explanation.counts.analyzed_words, 5);
}

#[test]
fn unknown_words_use_fallback_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let explanation = analyzer.explain("xylophone quartz", &SongInfo::default()).unwrap();
    assert_eq!(explanation.words.len(), 2);
    for word in &explanation.words {
        assert_eq!(word.source, ScoreSource::Fallback);
        assert!(!word.is_explicit);
    }
}

#[test]
fn failed_reload_keeps_serving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json.gz");
    let analyzer = analyzer_at(&path);

    let before = analyzer.classify("love in the morning", &SongInfo::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    let outcome = analyzer.reload();
    assert!(!outcome.success);
    let after = analyzer.classify("love in the morning", &SongInfo::default()).unwrap();
    assert_eq!(before.probabilities, after.probabilities);
    assert_eq!(analyzer.status().state, ModelState::Ready);
}

#[test]
fn successful_reload_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));
    let outcome = analyzer.reload();
    assert!(outcome.success, "{}", outcome.message);
    assert!(analyzer.registry().is_loaded());
}

#[test]
fn batch_limits_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let none: Vec<String> = Vec::new();
    assert!(matches!(analyzer.predict_batch(&none), Err(Error::EmptyBatch)));

    let too_many = vec!["love"; 101];
    assert!(matches!(
        analyzer.predict_batch(&too_many),
        Err(Error::BatchTooLarge { size: 101, max: 100 })
    ));

    let full = vec!["love"; 100];
    assert_eq!(analyzer.predict_batch(&full).unwrap().len(), 100);

    let texts = ["fuck this shit bitch", "", "I love you baby, my sunshine"];
    let items = analyzer.predict_batch(&texts).unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items.iter().map(|i| i.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(items[0].verdict().unwrap().is_explicit);
    assert!(matches!(items[1].outcome, BatchOutcome::Rejected { .. }));
    assert!(!items[2].verdict().unwrap().is_explicit);
}

#[test]
fn highlight_wraps_flagged_words() {
    let dir = tempfile::tempdir().unwrap();
    let analyzer = analyzer_at(&dir.path().join("model.json.gz"));

    let lyrics = "Damn, the river\nis damn cold";
    let explanation = analyzer.explain(lyrics, &SongInfo::default()).unwrap();
    let marked = explanation.highlight(lyrics, "[", "]");
    assert!(marked.starts_with("[Damn,]"));
    assert!(marked.contains("is [damn] cold"));
    assert!(marked.contains('\n'));
}

#[test]
fn readers_see_whole_models_during_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json.gz");
    let first_path = dir.path().join("first.json.gz");
    let second_path = dir.path().join("second.json.gz");
    artifact::save(&trained_pipeline(), &first_path).unwrap();
    artifact::save(&smaller_pipeline(), &second_path).unwrap();

    let lyrics = "Damn, walking by the river tonight with my love";
    let expected = [
        artifact::load(&first_path).unwrap().predict_proba_one(lyrics).unwrap(),
        artifact::load(&second_path).unwrap().predict_proba_one(lyrics).unwrap(),
    ];

    std::fs::copy(&first_path, &path).unwrap();
    let analyzer = LyricsAnalyzer::new(
        Arc::new(ModelRegistry::new(&path)),
        Arc::new(ExplicitLexicon::builtin().clone()),
        100,
    );

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let result = analyzer.classify(lyrics, &SongInfo::default()).unwrap();
                    assert!(
                        expected.contains(&result.probabilities),
                        "unexpected probabilities {:?}",
                        result.probabilities
                    );
                }
            });
        }
        scope.spawn(|| {
            for round in 0..20 {
                let source = if round % 2 == 0 { &second_path } else { &first_path };
                artifact::save(&artifact::load(source).unwrap(), &path).unwrap();
                let outcome = analyzer.reload();
                assert!(outcome.success, "{}", outcome.message);
            }
        });
    });
}
