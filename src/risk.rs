//! Keyword-driven risk indicator scoring.
//!
//! For each category the number of keyword hits in the token sequence is
//! normalized by `token_count * keyword_count` and squashed through a
//! logistic curve (see [`ScoringConfig`]). The scores are an engineered
//! proxy, not a trained model.

use std::collections::HashMap;

use crate::config::{RiskCategory, ScoringConfig};
use crate::models::RiskScores;
use crate::text::tokenize;

/// Logistic squashing of a normalized keyword frequency into `(0, 1)`.
pub fn squash(frequency: f64, scoring: &ScoringConfig) -> f64 {
    1.0 / (1.0 + (-scoring.steepness * (frequency - scoring.midpoint)).exp())
}

/// Score every category against `text`.
///
/// The result always holds exactly one entry per category. Text with no
/// tokens scores 0.0 everywhere, as does a category without keywords.
pub fn compute_risk_indicators(
    text: &str,
    categories: &[RiskCategory],
    scoring: &ScoringConfig,
) -> RiskScores {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return categories.iter().map(|c| (c.name.clone(), 0.0)).collect();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }

    categories
        .iter()
        .map(|category| {
            if category.keywords.is_empty() {
                return (category.name.clone(), 0.0);
            }
            let hits: usize = category
                .keywords
                .iter()
                .map(|k| counts.get(k.as_str()).copied().unwrap_or(0))
                .sum();
            let frequency = hits as f64 / (tokens.len() * category.keywords.len()) as f64;
            (category.name.clone(), squash(frequency, scoring))
        })
        .collect()
}
