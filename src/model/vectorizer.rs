//! TF-IDF vectorizer over unigrams and bigrams of normalized lyrics.
//!
//! The vocabulary is learned once by [`TfidfVectorizer::fit`] and frozen;
//! [`TfidfVectorizer::transform`] ignores every term it has not seen.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::training::{MAX_DF, MAX_FEATURES, MAX_NGRAM, MIN_DF};
use crate::error::{Error, Result};

/// Vocabulary pruning and n-gram settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Maximum number of terms kept, by corpus frequency.
    pub max_features: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Longest n-gram counted (1 = unigrams only).
    pub max_ngram: usize,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: MAX_FEATURES,
            min_df: MIN_DF,
            max_df: MAX_DF,
            max_ngram: MAX_NGRAM,
        }
    }
}

/// Sparse, L2-normalized feature vector keyed to a frozen vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from `(index, value)` pairs; zero values are dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, v)| v != 0.0);
        entries.sort_by_key(|&(i, _)| i);
        Self { dim, entries }
    }

    /// Vocabulary size the vector is keyed to.
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero `(index, value)` pairs in index order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Whether no vocabulary term was present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Frozen vocabulary and IDF weights, as persisted in artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    /// Settings the vocabulary was learned with.
    pub params: VectorizerParams,
    /// Terms in column order (sorted).
    pub terms: Vec<String>,
    /// IDF weight per column.
    pub idf: Vec<f64>,
}

#[derive(Debug, Clone)]
struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// TF-IDF vectorizer with smooth IDF and L2 row normalization.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    params: VectorizerParams,
    vocabulary: Option<Vocabulary>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(VectorizerParams::default())
    }
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer.
    pub const fn new(params: VectorizerParams) -> Self {
        Self { params, vocabulary: None }
    }

    /// Rebuild a fitted vectorizer from persisted state.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        if state.terms.len() != state.idf.len() {
            return Err(Error::corrupt(
                format!(
                    "vectorizer has {} terms but {} idf weights",
                    state.terms.len(),
                    state.idf.len()
                ),
                None,
            ));
        }
        if state.terms.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::corrupt("vectorizer terms are not sorted and unique", None));
        }
        if state.idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(Error::corrupt("vectorizer idf weights must be positive", None));
        }

        let index = state
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Ok(Self {
            params: state.params,
            vocabulary: Some(Vocabulary { terms: state.terms, index, idf: state.idf }),
        })
    }

    /// Persistable state. Fails if the vectorizer was never fit.
    pub fn state(&self) -> Result<VectorizerState> {
        let vocab = self.fitted()?;
        Ok(VectorizerState {
            params: self.params,
            terms: vocab.terms.clone(),
            idf: vocab.idf.clone(),
        })
    }

    /// Settings in use.
    pub const fn params(&self) -> &VectorizerParams {
        &self.params
    }

    /// Whether [`fit`](Self::fit) has run.
    pub const fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Number of vocabulary terms, or 0 when unfitted.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, |v| v.terms.len())
    }

    /// Column index of `term`, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.as_ref()?.index.get(term).copied()
    }

    /// Learn vocabulary and IDF weights from normalized documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let n_docs = documents.len();
        if n_docs == 0 {
            return Err(Error::dataset("cannot fit vectorizer on an empty corpus"));
        }

        let max_ngram = self.params.max_ngram;
        let per_doc: Vec<HashMap<String, usize>> = documents
            .par_iter()
            .map(|doc| term_counts(doc, max_ngram))
            .collect();

        // (document frequency, total count), ordered by term
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for counts in per_doc {
            for (term, count) in counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let max_doc_count = self.params.max_df * n_docs as f64;
        if max_doc_count < self.params.min_df as f64 {
            return Err(Error::dataset(format!(
                "max_df={} keeps fewer documents than min_df={} for a corpus of {n_docs}",
                self.params.max_df, self.params.min_df
            )));
        }

        let mut kept: Vec<(String, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= self.params.min_df && *df as f64 <= max_doc_count)
            .map(|(term, (df, total))| (term, df, total))
            .collect();
        if kept.is_empty() {
            return Err(Error::dataset("no terms remain after document-frequency pruning"));
        }

        // Stable sort keeps alphabetical order among equally frequent terms
        kept.sort_by(|a, b| b.2.cmp(&a.2));
        kept.truncate(self.params.max_features);
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let idf = kept
            .iter()
            .map(|(_, df, _)| ((1.0 + n_docs as f64) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let terms: Vec<String> = kept.into_iter().map(|(term, _, _)| term).collect();
        let index = terms.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();

        tracing::info!("Fitted vectorizer: {} terms from {n_docs} documents", terms.len());
        self.vocabulary = Some(Vocabulary { terms, index, idf });
        Ok(())
    }

    /// Vectorize one normalized document with the frozen vocabulary.
    pub fn transform(&self, document: &str) -> Result<FeatureVector> {
        let vocab = self.fitted()?;

        let mut weights: HashMap<usize, f64> = HashMap::new();
        for (term, count) in term_counts(document, self.params.max_ngram) {
            if let Some(&idx) = vocab.index.get(&term) {
                weights.insert(idx, count as f64 * vocab.idf[idx]);
            }
        }

        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        let entries = weights
            .into_iter()
            .map(|(idx, w)| (idx, if norm > 0.0 { w / norm } else { w }))
            .collect();
        Ok(FeatureVector::from_entries(vocab.terms.len(), entries))
    }

    /// Vectorize many documents in parallel, preserving order.
    pub fn transform_all(&self, documents: &[String]) -> Result<Vec<FeatureVector>> {
        documents.par_iter().map(|doc| self.transform(doc)).collect()
    }

    fn fitted(&self) -> Result<&Vocabulary> {
        self.vocabulary
            .as_ref()
            .ok_or(Error::ModelNotTrained { stage: "vectorizer" })
    }
}

/// Counts of all n-grams up to `max_ngram` in a whitespace-tokenized document.
fn term_counts(document: &str, max_ngram: usize) -> HashMap<String, usize> {
    let tokens: Vec<&str> = document.split_whitespace().collect();
    let mut counts = HashMap::new();
    for n in 1..=max_ngram.max(1) {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}
