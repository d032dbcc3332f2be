//! Fit-once text embedding: term weighting followed by truncated SVD.
//!
//! A [`FittedVectorizer`] maps arbitrary text to a fixed-width vector. It is
//! created by [`FittedVectorizer::fit`], written to a directory as two JSON
//! artifacts by [`FittedVectorizer::save`] and restored by
//! [`FittedVectorizer::load`]. Once built it is read-only and can be shared
//! across threads.
//!
//! # Artifacts
//!
//! | File | Contents |
//! |------|----------|
//! | `tfidf_vectorizer.json` | vocabulary, idf weights, n-gram range |
//! | `svd_transformer.json` | component matrix, singular values |
//!
//! Both carry the same `fit_id`; loading a mixed pair fails, as does loading
//! an artifact whose contents no longer match its `fit_id`.

mod svd;
mod tfidf;

pub use svd::SvdTransform;
pub use tfidf::TfidfModel;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::VectorizerConfig;
use crate::error::{PipelineError, Result};

pub const TFIDF_FILE: &str = "tfidf_vectorizer.json";
pub const SVD_FILE: &str = "svd_transformer.json";

#[derive(Debug, Clone, PartialEq)]
pub struct FittedVectorizer {
    tfidf: TfidfModel,
    svd: SvdTransform,
}

impl FittedVectorizer {
    /// Fit term weighting and the reduction transform on `texts`.
    pub fn fit(texts: &[String], config: &VectorizerConfig) -> Result<Self> {
        let (tfidf, matrix) = TfidfModel::fit(texts, config)?;
        let svd = SvdTransform::fit(&matrix, config.n_components, &tfidf.fit_id);
        info!(
            texts = texts.len(),
            vocabulary = tfidf.vocabulary_len(),
            components = svd.n_components(),
            "fitted vectorizer"
        );
        Ok(Self { tfidf, svd })
    }

    pub fn dims(&self) -> usize {
        self.svd.n_components()
    }

    pub fn fit_id(&self) -> &str {
        &self.tfidf.fit_id
    }

    pub fn tfidf(&self) -> &TfidfModel {
        &self.tfidf
    }

    pub fn svd(&self) -> &SvdTransform {
        &self.svd
    }

    /// Embed `text` into a `dims()`-wide vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        self.svd.transform(&self.tfidf.transform(text)).to_vec()
    }

    /// Write both artifacts into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        write_json(&dir.join(TFIDF_FILE), &self.tfidf)?;
        write_json(&dir.join(SVD_FILE), &self.svd)?;
        info!(dir = %dir.display(), fit_id = %self.fit_id(), "saved vectorizer");
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let tfidf_path = dir.join(TFIDF_FILE);
        let svd_path = dir.join(SVD_FILE);
        for path in [&tfidf_path, &svd_path] {
            if !path.is_file() {
                return Err(PipelineError::NotFound { path: path.clone() });
            }
        }

        let tfidf: TfidfModel = read_json(&tfidf_path)?;
        tfidf.check().map_err(|reason| PipelineError::CorruptArtifact {
            path: tfidf_path.clone(),
            reason,
        })?;
        let svd: SvdTransform = read_json(&svd_path)?;
        svd.check().map_err(|reason| PipelineError::CorruptArtifact {
            path: svd_path.clone(),
            reason,
        })?;
        if tfidf.fit_id != svd.fit_id || tfidf.vocabulary_len() != svd.n_features() {
            return Err(PipelineError::ArtifactMismatch {
                dir: dir.to_path_buf(),
                tfidf: tfidf.fit_id,
                svd: svd.fit_id,
            });
        }
        info!(dir = %dir.display(), fit_id = %tfidf.fit_id, "loaded vectorizer");
        Ok(Self { tfidf, svd })
    }
}

/// Write via a sibling temp file so a failed save never leaves a truncated
/// artifact behind.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp: PathBuf = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec(value)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus() -> Vec<String> {
        [
            "road budget cost overrun near the river",
            "road budget river crossing with steel",
            "bridge design river crossing and approach road",
            "bridge design steel deck and approach",
            "environmental clearance for the river crossing",
            "environmental clearance and budget approval",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn small_config() -> VectorizerConfig {
        VectorizerConfig {
            n_components: 4,
            ..VectorizerConfig::default()
        }
    }

    #[test]
    fn transform_width_matches_components() {
        let v = FittedVectorizer::fit(&corpus(), &small_config()).unwrap();
        assert_eq!(v.dims(), 4);
        assert_eq!(v.transform("road budget").len(), 4);
        assert_eq!(v.transform("").len(), 4);
    }

    #[test]
    fn default_width_is_one_hundred() {
        let v = FittedVectorizer::fit(&corpus(), &VectorizerConfig::default()).unwrap();
        assert_eq!(v.transform("bridge design").len(), 100);
    }

    #[test]
    fn save_load_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let fitted = FittedVectorizer::fit(&corpus(), &small_config()).unwrap();
        fitted.save(dir.path()).unwrap();

        let loaded = FittedVectorizer::load(dir.path()).unwrap();
        assert_eq!(loaded, fitted);
        let text = "bridge over the river with a budget";
        assert_eq!(loaded.transform(text), fitted.transform(text));
        assert!(!dir.path().join("tfidf_vectorizer.json.tmp").exists());
    }

    #[test]
    fn load_missing_artifact_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FittedVectorizer::load(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));

        FittedVectorizer::fit(&corpus(), &small_config())
            .unwrap()
            .save(dir.path())
            .unwrap();
        std::fs::remove_file(dir.path().join(SVD_FILE)).unwrap();
        let err = FittedVectorizer::load(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { ref path } if path.ends_with(SVD_FILE)));
    }

    #[test]
    fn load_rejects_artifacts_from_different_fits() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        FittedVectorizer::fit(&corpus(), &small_config())
            .unwrap()
            .save(a.path())
            .unwrap();
        FittedVectorizer::fit(&corpus()[..4], &small_config())
            .unwrap()
            .save(b.path())
            .unwrap();
        std::fs::copy(b.path().join(SVD_FILE), a.path().join(SVD_FILE)).unwrap();

        let err = FittedVectorizer::load(a.path()).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMismatch { .. }));
    }

    fn rewrite_tfidf(dir: &Path, edit: impl FnOnce(&mut serde_json::Value)) {
        let path = dir.join(TFIDF_FILE);
        let mut json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        edit(&mut json);
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();
    }

    #[test]
    fn load_rejects_truncated_idf() {
        let dir = TempDir::new().unwrap();
        FittedVectorizer::fit(&corpus(), &small_config())
            .unwrap()
            .save(dir.path())
            .unwrap();
        rewrite_tfidf(dir.path(), |json| json["idf"] = serde_json::json!([1.0]));

        let err = FittedVectorizer::load(dir.path()).unwrap_err();
        assert!(
            matches!(err, PipelineError::CorruptArtifact { ref path, .. } if path.ends_with(TFIDF_FILE))
        );
    }

    #[test]
    fn load_rejects_edited_weights() {
        let dir = TempDir::new().unwrap();
        FittedVectorizer::fit(&corpus(), &small_config())
            .unwrap()
            .save(dir.path())
            .unwrap();
        rewrite_tfidf(dir.path(), |json| json["idf"][0] = serde_json::json!(9.5));

        let err = FittedVectorizer::load(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::CorruptArtifact { ref reason, .. } if reason.contains("fit_id")));
    }
}
