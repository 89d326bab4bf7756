//! Lexical similarity between documents
//!
//! Each text becomes a bag-of-words count vector; two texts are compared by
//! the cosine of the angle between their vectors, reported as a percentage.

mod cosine;
mod vectorizer;

pub use cosine::{pairwise_similarity, similarity_percent, sort_by_score_desc, SimilarityEngine};
pub use vectorizer::{TermFrequencies, Tokenizer};
