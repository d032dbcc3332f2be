//! # DPR Features CLI (`dprf`)
//!
//! Command-line front end for the document processing and feature
//! extraction pipeline.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dprf process <file>` | Process one report and print it as JSON |
//! | `dprf fit <dir> --models <out>` | Fit the text embedding on a corpus and save it |
//! | `dprf features <dir> --models <dir>` | Build the feature table for a corpus |
//! | `dprf columns` | Print the feature column layout |
//!
//! Logs go to stderr; set `RUST_LOG` to change verbosity.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use dpr_features::config::{self, Config};
use dpr_features::corpus::{load_document, scan_corpus};
use dpr_features::export::export_table;
use dpr_features::features::{feature_columns, FeatureExtractor};
use dpr_features::models::Severity;
use dpr_features::processor::DocumentProcessor;
use dpr_features::vectorizer::FittedVectorizer;

/// Turn Detailed Project Reports into structured records and feature vectors.
#[derive(Parser)]
#[command(name = "dprf", version)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single report and print the result as JSON.
    ///
    /// A severity summary based on the weighted risk score goes to stderr.
    Process {
        /// Report file (.pdf, .docx, .xlsx or .txt by default).
        file: PathBuf,
    },

    /// Fit the text embedding on every report under a directory.
    Fit {
        /// Corpus directory.
        corpus: PathBuf,

        /// Directory the fitted artifacts are written to.
        #[arg(long)]
        models: PathBuf,
    },

    /// Build feature vectors for every report under a directory.
    Features {
        /// Corpus directory.
        corpus: PathBuf,

        /// Directory holding previously fitted artifacts.
        #[arg(long)]
        models: PathBuf,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print feature column names, one per line.
    Columns {
        /// Take the embedding width from fitted artifacts instead of the config.
        #[arg(long)]
        models: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    });

    match cli.command {
        Commands::Process { file } => run_process(cfg, &file)?,
        Commands::Fit { corpus, models } => run_fit(cfg, &corpus, &models)?,
        Commands::Features {
            corpus,
            models,
            output,
        } => run_features(cfg, &corpus, &models, output.as_deref())?,
        Commands::Columns { models } => {
            let dims = match models {
                Some(dir) => FittedVectorizer::load(&dir)?.dims(),
                None => cfg.vectorizer.n_components,
            };
            for column in feature_columns(&cfg, dims) {
                println!("{}", column);
            }
        }
    }

    Ok(())
}

fn run_process(cfg: Arc<Config>, file: &Path) -> Result<()> {
    let processor = DocumentProcessor::new(cfg.clone())?;
    let doc = load_document(file, &processor)?;

    let score = cfg.risk.weighted_score(&doc.risk_indicators);
    let severity = Severity::classify(score, &cfg.risk.severity);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    eprintln!(
        "{}: {} sections, weighted risk {:.4} ({})",
        doc.file_name,
        doc.sections.len(),
        score,
        severity
    );
    Ok(())
}

fn run_fit(cfg: Arc<Config>, corpus: &Path, models: &Path) -> Result<()> {
    let processor = DocumentProcessor::new(cfg.clone())?;
    let report = scan_corpus(corpus, &processor)?;
    if report.documents.is_empty() {
        bail!("No processable documents under {}", corpus.display());
    }

    let mut extractor = FeatureExtractor::new(cfg)?;
    extractor.fit(&report.documents)?;
    extractor.save(models)?;
    eprintln!(
        "Fitted on {} documents ({} skipped); artifacts in {}",
        report.documents.len(),
        report.skipped.len(),
        models.display()
    );
    Ok(())
}

fn run_features(
    cfg: Arc<Config>,
    corpus: &Path,
    models: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let processor = DocumentProcessor::new(cfg.clone())?;
    let mut extractor = FeatureExtractor::new(cfg)?;
    extractor.load(models)?;

    let report = scan_corpus(corpus, &processor)?;
    let table = extractor.build_feature_table(&report.documents)?;
    export_table(&table, output)
}
