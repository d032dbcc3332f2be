//! # DPR Features
//!
//! Turns Detailed Project Reports (PDF, DOCX, XLSX or plain text) into
//! structured records and fixed-width numeric feature vectors for downstream
//! risk models.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────────────┐   ┌──────────────┐
//! │ extract  │──▶│ processor │──▶│ ProcessedDocument │──▶│   features   │
//! │ pdf/docx │   │ sections  │   │ sections + risk   │   │ tfidf + svd  │
//! └──────────┘   │ risk      │   └───────────────────┘   │ meta + risk  │
//!                └───────────┘                           └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dprf process reports/bridge.pdf
//! dprf fit reports/ --models models/
//! dprf features reports/ --models models/ --output features.json
//! dprf columns --models models/
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with built-in defaults |
//! | [`models`] | Processed documents, severity, feature tables |
//! | [`error`] | Pipeline error type |
//! | [`text`] | Normalization, tokenization, lemmatization |
//! | [`sections`] | Heading-based section extraction |
//! | [`risk`] | Keyword-frequency risk scoring |
//! | [`processor`] | Raw text → [`models::ProcessedDocument`] |
//! | [`extract`] | Text extraction from PDF, DOCX, XLSX, TXT |
//! | [`corpus`] | Directory scanning into processed documents |
//! | [`vectorizer`] | Fit-once TF-IDF + truncated SVD |
//! | [`features`] | Feature vectors and tables |
//! | [`export`] | JSON output of feature tables |

pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod extract;
pub mod features;
pub mod models;
pub mod processor;
pub mod risk;
pub mod sections;
pub mod text;
pub mod vectorizer;
