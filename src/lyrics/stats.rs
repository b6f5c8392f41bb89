//! Surface statistics and token frequencies for lyrics.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::TextNormalizer;

/// Descriptive statistics of a lyrics text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    /// Whitespace-separated words.
    pub word_count: usize,
    /// Characters, counting Unicode scalar values.
    pub char_count: usize,
    /// Mean word length in characters.
    pub avg_word_length: f64,
    /// Occurrences of `.`, `!` and `?`.
    pub sentence_count: usize,
    /// Share of characters that are uppercase.
    pub uppercase_ratio: f64,
    /// Share of characters that are ASCII punctuation.
    pub punctuation_ratio: f64,
    /// Distinct words over total words.
    pub lexical_diversity: f64,
    /// Runs of the same character repeated three or more times.
    pub repeated_chars: usize,
    /// Words longer than one character written entirely in capitals.
    pub all_caps_words: usize,
}

/// Compute surface statistics. Empty text yields all zeros.
pub fn text_stats(text: &str) -> TextStats {
    if text.is_empty() {
        return TextStats::default();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let chars: Vec<char> = text.chars().collect();
    let ratio = |count: usize, total: usize| if total == 0 { 0.0 } else { count as f64 / total as f64 };

    let letter_total: usize = words.iter().map(|w| w.chars().count()).sum();
    let distinct: HashSet<&str> = words.iter().copied().collect();

    TextStats {
        word_count: words.len(),
        char_count: chars.len(),
        avg_word_length: ratio(letter_total, words.len()),
        sentence_count: chars.iter().filter(|c| matches!(c, '.' | '!' | '?')).count(),
        uppercase_ratio: ratio(chars.iter().filter(|c| c.is_uppercase()).count(), chars.len()),
        punctuation_ratio: ratio(chars.iter().filter(|c| c.is_ascii_punctuation()).count(), chars.len()),
        lexical_diversity: ratio(distinct.len(), words.len()),
        repeated_chars: count_repeated_runs(&chars),
        all_caps_words: words.iter().filter(|w| is_all_caps(w)).count(),
    }
}

/// Runs of one character repeated three or more times.
fn count_repeated_runs(chars: &[char]) -> usize {
    let mut runs = 0;
    let mut run_len = 0;
    let mut prev = None;
    for &c in chars {
        if prev == Some(c) {
            run_len += 1;
        } else {
            run_len = 1;
            prev = Some(c);
        }
        if run_len == 3 {
            runs += 1;
        }
    }
    runs
}

fn is_all_caps(word: &str) -> bool {
    word.chars().count() > 1
        && word.chars().any(char::is_alphabetic)
        && !word.chars().any(char::is_lowercase)
}

/// The `top_n` most frequent normalized tokens across `texts`.
///
/// Ties are broken alphabetically so the ordering is stable.
pub fn word_frequencies(normalizer: &TextNormalizer, texts: &[String], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for token in normalizer.tokens(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn empty_text_has_zero_stats() {
        assert_eq!(text_stats(""), TextStats::default());
    }

    #[test]
    fn counts_words_sentences_and_caps() {
        let stats = text_stats("YEAH yeah. Oh no!!! We go");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.sentence_count, 4);
        assert_eq!(stats.all_caps_words, 1);
        assert_eq!(stats.repeated_chars, 1);
        assert!((stats.lexical_diversity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeated_words_lower_diversity() {
        let stats = text_stats("na na na na");
        assert!((stats.lexical_diversity - 0.25).abs() < 1e-9);
        assert!((stats.avg_word_length - 2.0).abs() < 1e-9);
    }

    #[test]
    fn frequencies_rank_by_count_then_alpha() {
        let normalizer = TextNormalizer::new();
        let texts = vec![
            "Dancing dancing in the rain".to_string(),
            "Rain again, dancing alone".to_string(),
        ];
        let top = word_frequencies(&normalizer, &texts, 2);
        assert_eq!(top, vec![("danc".to_string(), 3), ("rain".to_string(), 2)]);
    }
}
