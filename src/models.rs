//! Core data models used throughout the pipeline.
//!
//! These types represent the processed documents produced by
//! [`DocumentProcessor`](crate::processor::DocumentProcessor) and the feature
//! tables produced by [`FeatureExtractor`](crate::features::FeatureExtractor).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::SeverityConfig;

/// Category name → score in `[0, 1]`.
pub type RiskScores = BTreeMap<String, f64>;

/// Structured record for one document.
///
/// `sections` only holds names whose heading matched. `risk_indicators` and
/// every entry of `section_risk_indicators` hold exactly the configured
/// category names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub file_name: String,
    pub file_path: String,
    pub file_size_mb: f64,
    /// Character count of the raw extracted text.
    pub document_length: usize,
    pub sections: BTreeMap<String, String>,
    pub risk_indicators: RiskScores,
    pub section_risk_indicators: BTreeMap<String, RiskScores>,
}

impl ProcessedDocument {
    /// Mean character length of the extracted sections, 0 when there are none.
    pub fn mean_section_length(&self) -> f64 {
        if self.sections.is_empty() {
            return 0.0;
        }
        let total: usize = self.sections.values().map(|s| s.chars().count()).sum();
        total as f64 / self.sections.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn classify(score: f64, bands: &SeverityConfig) -> Self {
        if score >= bands.high {
            Severity::High
        } else if score >= bands.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// One row of a [`FeatureTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub file_name: String,
    pub values: Vec<f64>,
}

/// Feature vectors for many documents with a named, deterministic column
/// layout. `columns` excludes the leading `file_name` column, which lives on
/// each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// All column names including the leading `file_name`.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once("file_name")
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_sections(sections: &[(&str, &str)]) -> ProcessedDocument {
        ProcessedDocument {
            file_name: "a.txt".to_string(),
            file_path: "/tmp/a.txt".to_string(),
            file_size_mb: 0.1,
            document_length: 10,
            sections: sections
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            risk_indicators: RiskScores::new(),
            section_risk_indicators: BTreeMap::new(),
        }
    }

    #[test]
    fn mean_section_length_empty_is_zero() {
        assert_eq!(doc_with_sections(&[]).mean_section_length(), 0.0);
    }

    #[test]
    fn mean_section_length_counts_chars() {
        let doc = doc_with_sections(&[("a", "abcd"), ("b", "ab")]);
        assert_eq!(doc.mean_section_length(), 3.0);
    }

    #[test]
    fn severity_bands() {
        let bands = SeverityConfig::default();
        assert_eq!(Severity::classify(0.0, &bands), Severity::Low);
        assert_eq!(Severity::classify(0.3, &bands), Severity::Medium);
        assert_eq!(Severity::classify(0.69, &bands), Severity::Medium);
        assert_eq!(Severity::classify(0.7, &bands), Severity::High);
        assert_eq!(Severity::High.to_string(), "high");
    }

    #[test]
    fn table_header_and_column_lookup() {
        let table = FeatureTable {
            columns: vec!["x".to_string(), "y".to_string()],
            rows: vec![
                FeatureRow {
                    file_name: "a".to_string(),
                    values: vec![1.0, 2.0],
                },
                FeatureRow {
                    file_name: "b".to_string(),
                    values: vec![3.0, 4.0],
                },
            ],
        };
        assert_eq!(table.header(), ["file_name", "x", "y"]);
        assert_eq!(table.column("y"), Some(vec![2.0, 4.0]));
        assert_eq!(table.column("z"), None);
    }
}
