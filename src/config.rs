//! TOML configuration.
//!
//! All catalogs the pipeline depends on (risk categories and keywords, the
//! section heading catalog, ingestion limits, vectorizer shape) live in a
//! single [`Config`] value that callers load once and pass to constructors.
//! [`Config::default`] carries the built-in catalogs, so a config file is
//! only needed to override them.

use anyhow::{bail, Context, Result};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::models::RiskScores;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            risk: RiskConfig::default(),
            scoring: ScoringConfig::default(),
            ingest: IngestConfig::default(),
            vectorizer: VectorizerConfig::default(),
            sections: default_sections(),
        }
    }
}

impl Config {
    /// Section names in catalog order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Risk category names in catalog order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.risk.categories.iter().map(|c| c.name.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        self.risk.validate()?;
        self.scoring.validate()?;
        self.ingest.validate()?;
        self.vectorizer.validate()?;

        if self.sections.is_empty() {
            bail!("at least one [[sections]] entry is required");
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.name.trim().is_empty() {
                bail!("section name must not be empty");
            }
            if !seen.insert(section.name.as_str()) {
                bail!("duplicate section name: '{}'", section.name);
            }
            RegexBuilder::new(&section.pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| {
                    format!("invalid heading pattern for section '{}'", section.name)
                })?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiskConfig {
    pub categories: Vec<RiskCategory>,
    #[serde(default)]
    pub severity: SeverityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiskCategory {
    pub name: String,
    pub weight: f64,
    pub keywords: Vec<String>,
}

impl RiskConfig {
    /// Weighted sum of category scores. Informative only; never part of a
    /// feature vector.
    pub fn weighted_score(&self, scores: &RiskScores) -> f64 {
        self.categories
            .iter()
            .map(|c| c.weight * scores.get(&c.name).copied().unwrap_or(0.0))
            .sum()
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            bail!("at least one [[risk.categories]] entry is required");
        }
        let mut seen = HashSet::new();
        let mut total = 0.0;
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                bail!("duplicate risk category: '{}'", category.name);
            }
            if !(0.0..=1.0).contains(&category.weight) {
                bail!(
                    "risk category '{}' weight must be in [0.0, 1.0]",
                    category.name
                );
            }
            if category.keywords.is_empty() {
                bail!("risk category '{}' has no keywords", category.name);
            }
            if let Some(kw) = category
                .keywords
                .iter()
                .find(|k| k.is_empty() || k.chars().any(char::is_uppercase))
            {
                bail!(
                    "risk category '{}' keyword '{}' must be non-empty lowercase",
                    category.name,
                    kw
                );
            }
            total += category.weight;
        }
        if (total - 1.0).abs() > 1e-6 {
            bail!("risk category weights must sum to 1.0 (got {:.4})", total);
        }
        self.severity.validate()
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        let category = |name: &str, weight: f64, keywords: &[&str]| RiskCategory {
            name: name.to_string(),
            weight,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        Self {
            categories: vec![
                category(
                    "financial",
                    0.25,
                    &[
                        "budget", "cost", "expense", "funding", "finance", "investment",
                        "money", "capital", "price", "financial", "economic", "revenue",
                        "profit", "loss", "debt", "overrun", "estimation", "allocation",
                        "shortage", "inflation",
                    ],
                ),
                category(
                    "environmental",
                    0.20,
                    &[
                        "environment", "ecology", "pollution", "emission", "waste",
                        "discharge", "conservation", "biodiversity", "habitat", "climate",
                        "sustainability", "contamination", "impact", "assessment",
                        "mitigation", "compliance", "clearance", "green", "natural",
                        "disaster",
                    ],
                ),
                category(
                    "technical",
                    0.25,
                    &[
                        "design", "specification", "technology", "engineering", "technical",
                        "architecture", "structure", "system", "infrastructure", "component",
                        "integration", "interface", "compatibility", "functionality",
                        "performance", "capacity", "requirement", "feasibility", "quality",
                        "obsolescence",
                    ],
                ),
                category(
                    "operational",
                    0.20,
                    &[
                        "operation", "implementation", "execution", "maintenance", "schedule",
                        "timeline", "deadline", "delay", "resource", "staff", "personnel",
                        "skill", "experience", "coordination", "management", "stakeholder",
                        "communication", "logistics", "supply", "chain",
                    ],
                ),
                category(
                    "regulatory",
                    0.10,
                    &[
                        "regulation", "compliance", "law", "legal", "legislation", "policy",
                        "requirement", "approval", "permit", "license", "certification",
                        "authority", "government", "restriction", "standard", "code",
                        "statute", "governance", "regulatory", "violation",
                    ],
                ),
            ],
            severity: SeverityConfig::default(),
        }
    }
}

/// Lower bounds of the medium and high severity bands.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeverityConfig {
    #[serde(default = "default_severity_medium")]
    pub medium: f64,
    #[serde(default = "default_severity_high")]
    pub high: f64,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            medium: default_severity_medium(),
            high: default_severity_high(),
        }
    }
}

impl SeverityConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0 < self.medium && self.medium < self.high && self.high < 1.0) {
            bail!("risk.severity bounds must satisfy 0 < medium < high < 1");
        }
        Ok(())
    }
}

fn default_severity_medium() -> f64 {
    0.3
}
fn default_severity_high() -> f64 {
    0.7
}

/// Logistic squashing applied to normalized keyword frequencies.
///
/// `score = 1 / (1 + exp(-steepness * (frequency - midpoint)))`. A frequency
/// equal to `midpoint` scores 0.5. Both values are tunables: only the shape
/// (monotonic, bounded in (0, 1), low for absent keywords) is relied upon.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScoringConfig {
    #[serde(default = "default_steepness")]
    pub steepness: f64,
    #[serde(default = "default_midpoint")]
    pub midpoint: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            steepness: default_steepness(),
            midpoint: default_midpoint(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        if !(self.steepness.is_finite() && self.steepness > 0.0) {
            bail!("scoring.steepness must be > 0");
        }
        if !(self.midpoint.is_finite() && self.midpoint > 0.0) {
            bail!("scoring.midpoint must be > 0");
        }
        Ok(())
    }
}

fn default_steepness() -> f64 {
    300.0
}
fn default_midpoint() -> f64 {
    0.01
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_supported_file_types")]
    pub supported_file_types: Vec<String>,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: f64,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            supported_file_types: default_supported_file_types(),
            max_file_size_mb: default_max_file_size_mb(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    fn validate(&self) -> Result<()> {
        if self.max_file_size_mb <= 0.0 {
            bail!("ingest.max_file_size_mb must be > 0");
        }
        if self.supported_file_types.is_empty() {
            bail!("ingest.supported_file_types must not be empty");
        }
        for ext in &self.supported_file_types {
            if !ext.starts_with('.') || ext.len() < 2 {
                bail!(
                    "ingest.supported_file_types entry '{}' must look like '.ext'",
                    ext
                );
            }
        }
        Ok(())
    }
}

fn default_supported_file_types() -> Vec<String> {
    [".pdf", ".docx", ".xlsx", ".txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_max_file_size_mb() -> f64 {
    50.0
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VectorizerConfig {
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    #[serde(default = "default_max_df")]
    pub max_df: f64,
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
    #[serde(default = "default_n_components")]
    pub n_components: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
            ngram_max: default_ngram_max(),
            n_components: default_n_components(),
        }
    }
}

impl VectorizerConfig {
    fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            bail!("vectorizer.max_features must be > 0");
        }
        if self.min_df == 0 {
            bail!("vectorizer.min_df must be >= 1");
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            bail!("vectorizer.max_df must be in (0.0, 1.0]");
        }
        if self.ngram_max == 0 {
            bail!("vectorizer.ngram_max must be >= 1");
        }
        if self.n_components == 0 {
            bail!("vectorizer.n_components must be > 0");
        }
        Ok(())
    }
}

fn default_max_features() -> usize {
    1000
}
fn default_min_df() -> usize {
    2
}
fn default_max_df() -> f64 {
    0.85
}
fn default_ngram_max() -> usize {
    2
}
fn default_n_components() -> usize {
    100
}

/// One entry of the section catalog: a name and its heading pattern.
/// Patterns are matched case-insensitively.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SectionConfig {
    pub name: String,
    pub pattern: String,
}

fn default_sections() -> Vec<SectionConfig> {
    [
        ("executive_summary", r"executive\s+summary|summary"),
        (
            "project_description",
            r"project\s+description|about\s+the\s+project",
        ),
        (
            "budget_estimation",
            r"budget|cost\s+estimation|financial\s+plan",
        ),
        (
            "technical_specifications",
            r"technical\s+specifications|technical\s+details",
        ),
        (
            "implementation_plan",
            r"implementation\s+plan|execution\s+plan",
        ),
        (
            "environmental_impact",
            r"environmental\s+impact|environmental\s+assessment",
        ),
        ("risk_assessment", r"risk\s+assessment|risk\s+analysis"),
    ]
    .iter()
    .map(|(name, pattern)| SectionConfig {
        name: name.to_string(),
        pattern: pattern.to_string(),
    })
    .collect()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
