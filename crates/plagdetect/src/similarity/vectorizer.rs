//! Tokenizer and term-frequency vectors

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::config::TokenizerConfig;

/// Runs of word characters delimited by whitespace or punctuation
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\w+\b").expect("word pattern is valid")
});

/// Splits text into word tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Tokens of `text` in reading order
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        let min_len = self.config.min_token_len.max(1);
        let lowercase = self.config.lowercase;

        WORD_PATTERN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(move |token| token.chars().count() >= min_len)
            .map(move |token| {
                if lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
    }

    /// Raw term-frequency vector of `text`
    pub fn vectorize(&self, text: &str) -> TermFrequencies {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in self.tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        TermFrequencies { counts }
    }
}

/// Sparse term-frequency vector
///
/// Terms absent from the map have count zero, so two maps describe vectors
/// over the union of their vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFrequencies {
    counts: HashMap<String, u32>,
}

impl TermFrequencies {
    /// Count for a term
    pub fn get(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms
    pub fn vocabulary_size(&self) -> usize {
        self.counts.len()
    }

    /// True when the text produced no tokens
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Squared Euclidean norm
    pub fn norm_squared(&self) -> f64 {
        self.counts
            .values()
            .map(|&c| {
                let c = c as f64;
                c * c
            })
            .sum()
    }

    /// Dot product with another vector
    pub fn dot(&self, other: &TermFrequencies) -> f64 {
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };

        small
            .counts
            .iter()
            .map(|(term, &count)| count as f64 * large.get(term) as f64)
            .sum()
    }
}
