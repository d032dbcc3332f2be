//! [`ProcessedDocument`] → fixed-width numeric feature vectors.
//!
//! A vector is the concatenation of three blocks, always in this order:
//!
//! | Block | Width | Columns |
//! |-------|-------|---------|
//! | text embedding | `vectorizer.n_components` | `text_feat_{i}` |
//! | metadata | 4 | `file_size_mb`, `doc_length`, `num_sections`, `avg_section_length` |
//! | risk | `C + C × S` | `risk_{category}`, then `risk_{section}_{category}` |
//!
//! where `C` is the number of risk categories and `S` the number of catalog
//! sections. Every catalog section contributes its columns whether or not a
//! document contains it, so vectors from different documents line up.

use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{FeatureRow, FeatureTable, ProcessedDocument};
use crate::vectorizer::FittedVectorizer;

pub const NUMERICAL_COLUMNS: [&str; 4] = [
    "file_size_mb",
    "doc_length",
    "num_sections",
    "avg_section_length",
];

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: Arc<Config>,
    vectorizer: Option<FittedVectorizer>,
}

impl FeatureExtractor {
    /// Validate `config`; the extractor starts unfitted.
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            vectorizer: None,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_some()
    }

    pub fn vectorizer(&self) -> Option<&FittedVectorizer> {
        self.vectorizer.as_ref()
    }

    /// Fit the text embedding on every section text of every document.
    ///
    /// On failure the previous state (fitted or not) is left untouched.
    pub fn fit(&mut self, corpus: &[ProcessedDocument]) -> Result<()> {
        let texts: Vec<String> = corpus
            .iter()
            .flat_map(|doc| doc.sections.values().cloned())
            .collect();
        if texts.is_empty() {
            return Err(PipelineError::InsufficientData(format!(
                "{} documents contain no section text",
                corpus.len()
            )));
        }
        self.vectorizer = Some(FittedVectorizer::fit(&texts, &self.config.vectorizer)?);
        Ok(())
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        self.fitted()?.save(dir)
    }

    /// Replace the current state with artifacts from `dir`.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        self.vectorizer = Some(FittedVectorizer::load(dir)?);
        Ok(())
    }

    pub fn extract_text_features(&self, text: &str) -> Result<Vec<f64>> {
        Ok(self.fitted()?.transform(text))
    }

    pub fn extract_numerical_features(&self, doc: &ProcessedDocument) -> [f64; 4] {
        [
            doc.file_size_mb,
            doc.document_length as f64,
            doc.sections.len() as f64,
            doc.mean_section_length(),
        ]
    }

    /// Document-level scores per category, then per catalog section per
    /// category, 0.0 for sections the document lacks.
    pub fn extract_risk_features(&self, doc: &ProcessedDocument) -> Vec<f64> {
        let categories: Vec<&str> = self.config.category_names().collect();
        let mut features = Vec::with_capacity(categories.len() * (1 + self.config.sections.len()));

        features.extend(
            categories
                .iter()
                .map(|c| doc.risk_indicators.get(*c).copied().unwrap_or(0.0)),
        );
        for section in self.config.section_names() {
            let scores = doc.section_risk_indicators.get(section);
            features.extend(categories.iter().map(|c| {
                scores
                    .and_then(|s| s.get(*c))
                    .copied()
                    .unwrap_or(0.0)
            }));
        }
        features
    }

    /// Full feature vector: text embedding of all section texts joined in
    /// catalog order, metadata, and risk blocks.
    pub fn extract_features(&self, doc: &ProcessedDocument) -> Result<Vec<f64>> {
        let joined = self
            .config
            .section_names()
            .filter_map(|name| doc.sections.get(name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let mut features = self.extract_text_features(&joined)?;
        features.extend(self.extract_numerical_features(doc));
        features.extend(self.extract_risk_features(doc));
        Ok(features)
    }

    /// Column names matching [`extract_features`](Self::extract_features).
    pub fn feature_columns(&self) -> Result<Vec<String>> {
        Ok(feature_columns(&self.config, self.fitted()?.dims()))
    }

    /// One row per document, in input order. Documents are processed in
    /// parallel against the shared read-only fitted state.
    pub fn build_feature_table(&self, docs: &[ProcessedDocument]) -> Result<FeatureTable> {
        let columns = self.feature_columns()?;
        let rows = docs
            .par_iter()
            .map(|doc| {
                Ok(FeatureRow {
                    file_name: doc.file_name.clone(),
                    values: self.extract_features(doc)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            documents = rows.len(),
            columns = columns.len(),
            "built feature table"
        );
        Ok(FeatureTable { columns, rows })
    }

    fn fitted(&self) -> Result<&FittedVectorizer> {
        self.vectorizer.as_ref().ok_or(PipelineError::NotFitted)
    }
}

/// Deterministic column layout for `text_dims` embedding columns.
pub fn feature_columns(config: &Config, text_dims: usize) -> Vec<String> {
    let mut columns: Vec<String> = (0..text_dims).map(|i| format!("text_feat_{}", i)).collect();
    columns.extend(NUMERICAL_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend(config.category_names().map(|c| format!("risk_{}", c)));
    for section in config.section_names() {
        columns.extend(
            config
                .category_names()
                .map(|c| format!("risk_{}_{}", section, c)),
        );
    }
    columns
}
