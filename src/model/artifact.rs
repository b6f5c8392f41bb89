//! Versioned on-disk form of a trained [`Pipeline`].
//!
//! An artifact is gzip-compressed JSON holding all three stages plus a format
//! tag. Loading either restores the whole pipeline or fails; there is no
//! partial load.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use super::classifier::{ClassifierState, MultinomialNb};
use super::pipeline::{Pipeline, TrainingInfo};
use super::vectorizer::{TfidfVectorizer, VectorizerState};
use crate::constants::artifact::{FORMAT, VERSION};
use crate::error::{Error, Result};
use crate::lyrics::{NormalizerConfig, TextNormalizer};

/// Serialized bundle of every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    /// Format identifier.
    pub format: String,
    /// Format version.
    pub version: u32,
    /// Normalizer settings.
    pub normalizer: NormalizerConfig,
    /// Vocabulary and IDF weights.
    pub vectorizer: VectorizerState,
    /// Naive Bayes parameters.
    pub classifier: ClassifierState,
    /// Training provenance.
    pub training: TrainingInfo,
}

/// Only the header, read first so a newer format is reported as such rather
/// than as a field mismatch.
#[derive(Deserialize)]
struct ArtifactHeader {
    format: String,
    version: u32,
}

impl PipelineArtifact {
    /// Capture a trained pipeline.
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Self> {
        Ok(Self {
            format: FORMAT.to_string(),
            version: VERSION,
            normalizer: pipeline.normalizer().config().clone(),
            vectorizer: pipeline.vectorizer().state()?,
            classifier: pipeline.classifier().state()?.clone(),
            training: pipeline.training().clone(),
        })
    }

    /// Rebuild the pipeline, validating that all stages belong together.
    pub fn into_pipeline(self) -> Result<Pipeline> {
        check_header(&self.format, self.version)?;
        let normalizer = TextNormalizer::from_config(self.normalizer)?;
        let vectorizer = TfidfVectorizer::from_state(self.vectorizer)?;
        let classifier = MultinomialNb::from_state(self.classifier)?;
        Pipeline::new(normalizer, vectorizer, classifier, self.training)
    }
}

fn check_header(format: &str, version: u32) -> Result<()> {
    if format != FORMAT || version != VERSION {
        return Err(Error::IncompatibleArtifact {
            found: format!("{format} v{version}"),
            expected: format!("{FORMAT} v{VERSION}"),
        });
    }
    Ok(())
}

/// Write `pipeline` to `path`.
///
/// The artifact is written to a sibling temporary file and renamed into place,
/// so a concurrent reader sees either the old artifact or the new one.
pub fn save(pipeline: &Pipeline, path: &Path) -> Result<()> {
    let artifact = PipelineArtifact::from_pipeline(pipeline)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = fs_err::File::create(&tmp_path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, &artifact)?;
        encoder
            .finish()
            .and_then(|mut w| w.flush())
            .map_err(|e| Error::io(e, tmp_path.clone()))?;
    }
    fs_err::rename(&tmp_path, path)?;

    tracing::info!(
        "Saved model artifact ({} terms) to {}",
        pipeline.vocabulary_size(),
        path.display()
    );
    Ok(())
}

/// Read and validate the artifact at `path`.
pub fn load(path: &Path) -> Result<Pipeline> {
    let file = fs_err::File::open(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    let mut json = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut json)
        .map_err(|e| Error::corrupt(format!("not a gzip artifact: {e}"), path.to_path_buf()))?;

    let header: ArtifactHeader = serde_json::from_slice(&json)
        .map_err(|e| Error::corrupt(format!("missing artifact header: {e}"), path.to_path_buf()))?;
    check_header(&header.format, header.version)?;

    let artifact: PipelineArtifact = serde_json::from_slice(&json)
        .map_err(|e| Error::corrupt(e.to_string(), path.to_path_buf()))?;
    let pipeline = artifact.into_pipeline().map_err(|e| match e {
        Error::CorruptArtifact { message, .. } => Error::corrupt(message, path.to_path_buf()),
        other => other,
    })?;

    tracing::info!(
        "Loaded model artifact ({} terms) from {}",
        pipeline.vocabulary_size(),
        path.display()
    );
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::model::training::{train, LabeledLyrics, TrainingConfig};
    use crate::types::PredictionClass;

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

    fn write_gz_json(path: &Path, value: &serde_json::Value) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, value).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn save_then_load_restores_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models/model.json.gz");
        let pipeline = trained();
        save(&pipeline, &path).unwrap();

        let loaded = load(&path).unwrap();
        let text = ["damn this night", "happy morning garden"];
        assert_eq!(loaded.predict(&text).unwrap(), pipeline.predict(&text).unwrap());
        assert_eq!(loaded.predict(&text).unwrap()[0], PredictionClass::Explicit);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json.gz")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        assert!(matches!(load(&path), Err(Error::CorruptArtifact { .. })));
    }

    #[test]
    fn other_version_is_incompatible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json.gz");
        let mut value = serde_json::to_value(PipelineArtifact::from_pipeline(&trained()).unwrap()).unwrap();
        value["version"] = serde_json::json!(VERSION + 1);
        write_gz_json(&path, &value);

        assert!(matches!(load(&path), Err(Error::IncompatibleArtifact { .. })));
    }

    #[test]
    fn mismatched_stages_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatch.json.gz");
        let mut artifact = PipelineArtifact::from_pipeline(&trained()).unwrap();
        artifact.classifier.feature_log_prob[0].push(-1.0);
        artifact.classifier.feature_log_prob[1].push(-1.0);
        write_gz_json(&path, &serde_json::to_value(&artifact).unwrap());

        match load(&path) {
            Err(Error::CorruptArtifact { path: Some(p), .. }) => assert_eq!(p, path),
            other => panic!("expected corrupt artifact, got {other:?}"),
        }
    }
}
