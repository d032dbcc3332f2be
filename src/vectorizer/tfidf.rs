//! Term-weighting model.
//!
//! Terms are lowercase word runs of at least two characters plus adjacent
//! n-grams of them up to `ngram_max`. No stop-word removal or lemmatization
//! happens here; the vocabulary is pruned by document frequency instead.

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::config::VectorizerConfig;
use crate::error::{PipelineError, Result};
use crate::text::word_tokens;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
    /// Fingerprint of vocabulary and idf, shared with the paired transform.
    pub fit_id: String,
    pub fitted_at: DateTime<Utc>,
    pub n_documents: usize,
    ngram_max: usize,
    /// Term → column index; indices follow alphabetical term order.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfModel {
    /// Fit on `texts`, returning the model and the weighted training matrix
    /// (one L2-normalized row per text).
    pub fn fit(texts: &[String], config: &VectorizerConfig) -> Result<(Self, Array2<f64>)> {
        let n_documents = texts.len();
        if n_documents == 0 {
            return Err(PipelineError::InsufficientData(
                "no section text to fit on".to_string(),
            ));
        }

        let max_doc_count = config.max_df * n_documents as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(PipelineError::InsufficientData(format!(
                "{} texts: max_df={} admits fewer documents than min_df={}",
                n_documents, config.max_df, config.min_df
            )));
        }

        let doc_counts: Vec<HashMap<String, usize>> = texts
            .iter()
            .map(|t| term_counts(t, config.ngram_max))
            .collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let mut total_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            for (term, &count) in counts {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                *total_freq.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let mut kept: Vec<(&str, usize)> = doc_freq
            .iter()
            .filter(|(_, df)| **df >= config.min_df && **df as f64 <= max_doc_count)
            .map(|(&term, _)| (term, total_freq[term]))
            .collect();
        if kept.is_empty() {
            return Err(PipelineError::InsufficientData(
                "no terms remain after document-frequency pruning".to_string(),
            ));
        }
        if kept.len() > config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(config.max_features);
        }
        kept.sort_by(|a, b| a.0.cmp(b.0));

        let vocabulary: BTreeMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, (term, _))| (term.to_string(), idx))
            .collect();
        let n = n_documents as f64;
        let idf: Vec<f64> = kept
            .iter()
            .map(|(term, _)| ((1.0 + n) / (1.0 + doc_freq[term] as f64)).ln() + 1.0)
            .collect();

        let mut model = Self {
            fit_id: String::new(),
            fitted_at: Utc::now(),
            n_documents,
            ngram_max: config.ngram_max,
            vocabulary,
            idf,
        };
        model.fit_id = model.fingerprint();

        let mut matrix = Array2::<f64>::zeros((n_documents, model.vocabulary.len()));
        for (row, counts) in doc_counts.iter().enumerate() {
            matrix.row_mut(row).assign(&model.weigh(counts));
        }
        Ok((model, matrix))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Weighted, L2-normalized term vector for `text`.
    pub fn transform(&self, text: &str) -> Array1<f64> {
        self.weigh(&term_counts(text, self.ngram_max))
    }

    /// Internal consistency of a deserialized model: one finite idf weight
    /// per vocabulary column, indices forming `0..len`, and a `fit_id` that
    /// still matches the contents.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.ngram_max == 0 {
            return Err("ngram_max must be >= 1".to_string());
        }
        if self.idf.len() != self.vocabulary.len() {
            return Err(format!(
                "{} idf weights for {} vocabulary terms",
                self.idf.len(),
                self.vocabulary.len()
            ));
        }
        let mut seen = vec![false; self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(format!("bad column index {} for term '{}'", idx, term)),
            }
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err("non-finite idf weight".to_string());
        }
        if self.fingerprint() != self.fit_id {
            return Err("contents do not match fit_id".to_string());
        }
        Ok(())
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> Array1<f64> {
        let mut row = Array1::<f64>::zeros(self.vocabulary.len());
        for (term, &count) in counts {
            if let Some(&idx) = self.vocabulary.get(term) {
                row[idx] = count as f64 * self.idf[idx];
            }
        }
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row /= norm;
        }
        row
    }

    fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.ngram_max as u64).to_le_bytes());
        for (term, &idx) in &self.vocabulary {
            hasher.update(term.as_bytes());
            hasher.update([0u8]);
            hasher.update(self.idf[idx].to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Count unigrams through `ngram_max`-grams of `text`.
fn term_counts(text: &str, ngram_max: usize) -> HashMap<String, usize> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = word_tokens(&lowered)
        .filter(|t| t.chars().count() >= 2)
        .collect();

    let mut counts = HashMap::new();
    for n in 1..=ngram_max.max(1) {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        [
            "road budget cost overrun",
            "road budget river crossing",
            "bridge design river crossing",
            "bridge design steel deck",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn config() -> VectorizerConfig {
        VectorizerConfig::default()
    }

    #[test]
    fn empty_corpus_is_insufficient() {
        let err = TfidfModel::fit(&[], &config()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn too_few_texts_for_df_bounds() {
        let texts = vec!["road budget".to_string(), "road budget".to_string()];
        let err = TfidfModel::fit(&texts, &config()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn no_shared_terms_is_insufficient() {
        let texts: Vec<String> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = TfidfModel::fit(&texts, &config()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn vocabulary_respects_document_frequency() {
        let (model, matrix) = TfidfModel::fit(&corpus(), &config()).unwrap();
        // df == 2 terms survive; df == 1 terms do not.
        let expected = [
            "road",
            "budget",
            "river",
            "crossing",
            "bridge",
            "design",
            "road budget",
            "river crossing",
            "bridge design",
        ];
        for term in expected {
            assert!(model.contains(term), "missing {term}");
        }
        for term in ["cost", "overrun", "steel", "deck", "budget cost"] {
            assert!(!model.contains(term), "unexpected {term}");
        }
        assert_eq!(matrix.nrows(), 4);
        assert_eq!(matrix.ncols(), model.vocabulary_len());
    }

    #[test]
    fn max_df_drops_ubiquitous_terms() {
        let texts: Vec<String> = [
            "project road",
            "project road",
            "project bridge",
            "project bridge",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let (model, _) = TfidfModel::fit(&texts, &config()).unwrap();
        assert!(!model.contains("project"));
        assert!(model.contains("road"));
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let cfg = VectorizerConfig {
            max_features: 2,
            ngram_max: 1,
            ..config()
        };
        let texts: Vec<String> = [
            "road road road bridge",
            "road road bridge river",
            "river tunnel",
            "tunnel",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let (model, _) = TfidfModel::fit(&texts, &cfg).unwrap();
        assert_eq!(model.vocabulary_len(), 2);
        assert!(model.contains("road"));
        // bridge, river and tunnel tie on frequency; alphabetical order breaks it.
        assert!(model.contains("bridge"));
    }

    #[test]
    fn transform_is_unit_length_or_zero() {
        let (model, _) = TfidfModel::fit(&corpus(), &config()).unwrap();
        let v = model.transform("Road budget near the river");
        assert!((v.dot(&v) - 1.0).abs() < 1e-9);
        let zero = model.transform("nothing known here");
        assert!(zero.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn fingerprint_is_stable_for_same_corpus() {
        let (a, _) = TfidfModel::fit(&corpus(), &config()).unwrap();
        let (b, _) = TfidfModel::fit(&corpus(), &config()).unwrap();
        assert_eq!(a.fit_id, b.fit_id);
        assert_eq!(a.transform("road bridge"), b.transform("road bridge"));
    }

    #[test]
    fn term_counts_include_bigrams() {
        let counts = term_counts("A road, a road!", 2);
        assert_eq!(counts["road"], 2);
        assert_eq!(counts["road road"], 1);
        assert!(!counts.contains_key("a"));
    }
}
