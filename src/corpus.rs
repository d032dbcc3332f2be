//! Directory corpus loading.
//!
//! Walks a directory, filters paths with the `ingest` include/exclude globs,
//! and turns every file into a [`ProcessedDocument`]: size and extension
//! check, text extraction, then [`DocumentProcessor::process`]. Files that
//! fail any step are skipped and reported, never fatal to the whole scan.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::extract::extract_file;
use crate::models::ProcessedDocument;
use crate::processor::{validate_file, DocumentProcessor};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Default)]
pub struct CorpusReport {
    pub documents: Vec<ProcessedDocument>,
    /// Entries that could not be read, and files that matched the globs but
    /// could not be processed.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Load and process every matching file under `root`, sorted by relative path.
pub fn scan_corpus(root: &Path, processor: &DocumentProcessor) -> Result<CorpusReport> {
    if !root.is_dir() {
        bail!("Corpus root is not a directory: {}", root.display());
    }
    let ingest = &processor.config().ingest;
    let include_set = build_globset(&ingest.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/target/**".to_string()];
    default_excludes.extend(ingest.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut report = CorpusReport::default();
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(ingest.follow_symlinks) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                report.skipped.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();
        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    paths.sort();

    for path in paths {
        match load_document(&path, processor) {
            Ok(doc) => report.documents.push(doc),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                report.skipped.push((path, e.to_string()));
            }
        }
    }

    info!(
        root = %root.display(),
        documents = report.documents.len(),
        skipped = report.skipped.len(),
        "scanned corpus"
    );
    Ok(report)
}

/// Validate, extract and process a single file.
pub fn load_document(path: &Path, processor: &DocumentProcessor) -> Result<ProcessedDocument> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let size_mb = std::fs::metadata(path)?.len() as f64 / BYTES_PER_MB;

    validate_file(&file_name, size_mb, processor.config())?;
    let text = extract_file(path)?;
    let doc = processor.process(&text, &file_name, &path.to_string_lossy(), size_mb)?;
    Ok(doc)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
