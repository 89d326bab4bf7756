//! Cosine similarity and the pivot × target cross product

use std::cmp::Ordering;

use crate::config::TokenizerConfig;
use crate::types::{NamedText, SimilarityResult};

use super::vectorizer::{TermFrequencies, Tokenizer};

/// Computes similarity percentages with a fixed tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine {
    tokenizer: Tokenizer,
}

impl SimilarityEngine {
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config),
        }
    }

    /// Similarity of two texts in [0, 100]
    pub fn similarity_percent(&self, text_a: &str, text_b: &str) -> f64 {
        let a = self.tokenizer.vectorize(text_a);
        let b = self.tokenizer.vectorize(text_b);
        cosine_percent(&a, &b)
    }

    /// One result per (pivot, target) pair, pivot-major then target-minor
    ///
    /// Each document is vectorized once and reused across the cross product.
    pub fn pairwise_similarity(
        &self,
        pivots: &[NamedText],
        targets: &[NamedText],
    ) -> Vec<SimilarityResult> {
        let target_vectors: Vec<TermFrequencies> = targets
            .iter()
            .map(|t| self.tokenizer.vectorize(&t.text))
            .collect();

        let mut results = Vec::with_capacity(pivots.len() * targets.len());
        for pivot in pivots {
            let pivot_vector = self.tokenizer.vectorize(&pivot.text);
            for (target, target_vector) in targets.iter().zip(&target_vectors) {
                results.push(SimilarityResult {
                    pivot_filename: pivot.name.clone(),
                    target_filename: target.name.clone(),
                    similarity: cosine_percent(&pivot_vector, target_vector),
                });
            }
        }

        tracing::debug!(
            "Computed {} similarities ({} pivots x {} targets)",
            results.len(),
            pivots.len(),
            targets.len()
        );
        results
    }
}

/// Similarity of two texts in [0, 100] with the default tokenizer
pub fn similarity_percent(text_a: &str, text_b: &str) -> f64 {
    SimilarityEngine::default().similarity_percent(text_a, text_b)
}

/// Full pivot × target cross product with the default tokenizer
pub fn pairwise_similarity(pivots: &[NamedText], targets: &[NamedText]) -> Vec<SimilarityResult> {
    SimilarityEngine::default().pairwise_similarity(pivots, targets)
}

/// Sort results by descending similarity, keeping input order among ties
pub fn sort_by_score_desc(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
}

/// Cosine of two count vectors scaled to a percentage
///
/// A text without tokens has no direction, so any comparison involving one
/// scores 0. The denominator is `sqrt(|a|² · |b|²)` so that identical vectors
/// give exactly 100 and swapping the arguments gives the same bits.
fn cosine_percent(a: &TermFrequencies, b: &TermFrequencies) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let denominator = (a.norm_squared() * b.norm_squared()).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    let cosine = (a.dot(b) / denominator).clamp(0.0, 1.0);
    cosine * 100.0
}
