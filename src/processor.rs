//! Raw text → [`ProcessedDocument`].
//!
//! The processor is built from a [`Config`] and holds no other state, so a
//! single instance can be shared across threads.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{ProcessedDocument, RiskScores};
use crate::risk;
use crate::sections::SectionCatalog;
use crate::text;

#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    config: Arc<Config>,
    catalog: SectionCatalog,
}

impl DocumentProcessor {
    /// Validate `config` and compile its section catalog.
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        config.validate()?;
        let catalog = SectionCatalog::new(&config.sections)?;
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn preprocess(&self, text: &str) -> String {
        text::preprocess(text)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text::tokenize(text)
    }

    pub fn extract_sections(&self, text: &str) -> BTreeMap<String, String> {
        self.catalog.extract(text)
    }

    pub fn compute_risk_indicators(&self, text: &str) -> RiskScores {
        risk::compute_risk_indicators(text, &self.config.risk.categories, &self.config.scoring)
    }

    /// Build the structured record for one document.
    ///
    /// Rejects files whose extension or size violate the ingest limits before
    /// doing any text work. Missing sections are not an error.
    pub fn process(
        &self,
        raw_text: &str,
        file_name: &str,
        file_path: &str,
        file_size_mb: f64,
    ) -> Result<ProcessedDocument> {
        validate_file(file_name, file_size_mb, &self.config)?;

        let preprocessed = self.preprocess(raw_text);
        let sections = self.extract_sections(&preprocessed);
        let risk_indicators = self.compute_risk_indicators(&preprocessed);
        let section_risk_indicators = sections
            .iter()
            .map(|(name, body)| (name.clone(), self.compute_risk_indicators(body)))
            .collect();

        debug!(
            file = file_name,
            chars = raw_text.chars().count(),
            sections = sections.len(),
            "processed document"
        );

        Ok(ProcessedDocument {
            file_name: file_name.to_string(),
            file_path: file_path.to_string(),
            file_size_mb,
            document_length: raw_text.chars().count(),
            sections,
            risk_indicators,
            section_risk_indicators,
        })
    }
}

/// Check a file's extension and size against `ingest` limits.
pub fn validate_file(file_name: &str, file_size_mb: f64, config: &Config) -> Result<()> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    if !config
        .ingest
        .supported_file_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&extension))
    {
        return Err(PipelineError::UnsupportedFormat {
            file_name: file_name.to_string(),
            extension,
        });
    }

    if !file_size_mb.is_finite() || file_size_mb < 0.0 {
        return Err(PipelineError::InvalidFileSize {
            size_mb: file_size_mb,
        });
    }
    if file_size_mb > config.ingest.max_file_size_mb {
        return Err(PipelineError::FileTooLarge {
            size_mb: file_size_mb,
            max_mb: config.ingest.max_file_size_mb,
        });
    }
    Ok(())
}
