//! Error types for the feature-extraction pipeline.
//!
//! Every failure is a usage or input error raised synchronously to the
//! caller. Nothing here is transient, so nothing is retried and no partial
//! result is returned alongside an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::extract::ExtractError;

/// Errors raised by [`DocumentProcessor`](crate::processor::DocumentProcessor)
/// and [`FeatureExtractor`](crate::features::FeatureExtractor).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File extension is outside `ingest.supported_file_types`.
    #[error("unsupported file format: '{extension}' ({file_name})")]
    UnsupportedFormat { file_name: String, extension: String },

    /// File is larger than `ingest.max_file_size_mb`.
    #[error("file size ({size_mb:.2} MB) exceeds the maximum allowed size ({max_mb} MB)")]
    FileTooLarge { size_mb: f64, max_mb: f64 },

    /// Size is negative, NaN or infinite.
    #[error("invalid file size: {size_mb} MB")]
    InvalidFileSize { size_mb: f64 },

    /// Nothing (or too little) to fit the vectorizer on.
    #[error("insufficient data to fit vectorizer: {0}")]
    InsufficientData(String),

    /// Text features requested before `fit` or `load`.
    #[error("vectorizer is not fitted or loaded")]
    NotFitted,

    /// A saved artifact is missing from the model directory.
    #[error("vectorizer artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The two saved artifacts come from different fits.
    #[error("artifacts in {} come from different fits ({tfidf} vs {svd})", dir.display())]
    ArtifactMismatch {
        dir: PathBuf,
        tfidf: String,
        svd: String,
    },

    /// A saved artifact does not describe a usable model.
    #[error("corrupt vectorizer artifact {}: {reason}", path.display())]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
