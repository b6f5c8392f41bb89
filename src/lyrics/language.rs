//! English stopwords and stemming.
//!
//! Stopwords are the NLTK English list from the `stop-words` crate; stems come
//! from the Snowball English algorithm in `rust-stemmers`.

use std::collections::HashSet;

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use stop_words::LANGUAGE;

lazy_static! {
    static ref STOPWORDS: HashSet<String> = stop_words::get(LANGUAGE::English)
        .iter()
        .map(ToString::to_string)
        .collect();
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Whether `token` (already lowercased) is an English stopword.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Stem a lowercase token.
pub fn stem(token: &str) -> String {
    STEMMER.stem(token).into_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn common_function_words_are_stopwords() {
        for word in ["the", "and", "you", "more", "than", "can", "don"] {
            assert!(is_stopword(word), "{word} should be a stopword");
        }
    }

    #[test]
    fn content_words_are_not_stopwords() {
        for word in ["love", "words", "say", "damn", "song"] {
            assert!(!is_stopword(word), "{word} should not be a stopword");
        }
    }

    #[test]
    fn lyric_vocabulary_stems() {
        assert_eq!(stem("love"), "love");
        assert_eq!(stem("words"), "word");
        assert_eq!(stem("dancing"), "danc");
        assert_eq!(stem("fucking"), "fuck");
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("say"), "say");
    }

    #[test]
    fn long_y_runs_stem_on_a_small_stack() {
        let word = format!("a{}", "y".repeat(200_000));
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || stem(&word).len())
            .unwrap();
        assert!(handle.join().unwrap() > 0);
    }
}
