//! Truncated SVD over a weighted term matrix.
//!
//! The right singular vectors of `X` are the eigenvectors of `XᵀX`, so the
//! transform is fitted with a symmetric eigen-decomposition of the
//! (vocabulary × vocabulary) Gram matrix. Components are ordered by
//! singular value and sign-normalized so the same matrix always yields the
//! same transform. Components beyond the numerical rank are zero, which
//! keeps the output width at `n_components` even for tiny vocabularies.

use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative eigenvalue floor below which a component counts as null.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvdTransform {
    pub fit_id: String,
    pub fitted_at: DateTime<Utc>,
    /// `n_components × n_features`, one component per row.
    components: Array2<f64>,
    singular_values: Vec<f64>,
}

impl SvdTransform {
    pub fn fit(matrix: &Array2<f64>, n_components: usize, fit_id: &str) -> Self {
        let n_features = matrix.ncols();
        let gram = matrix.t().dot(matrix);
        let eigen = SymmetricEigen::new(DMatrix::from_fn(n_features, n_features, |i, j| {
            gram[[i, j]]
        }));

        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .total_cmp(&eigen.eigenvalues[a])
                .then(a.cmp(&b))
        });
        let largest = order
            .first()
            .map(|&i| eigen.eigenvalues[i])
            .unwrap_or(0.0)
            .max(0.0);

        let mut components = Array2::<f64>::zeros((n_components, n_features));
        let mut singular_values = vec![0.0; n_components];
        let mut rank = 0;
        for (k, &col) in order.iter().take(n_components).enumerate() {
            let value = eigen.eigenvalues[col];
            if largest == 0.0 || value <= largest * RANK_TOLERANCE {
                break;
            }
            let vector = eigen.eigenvectors.column(col);
            let pivot = vector
                .iter()
                .copied()
                .fold(0.0f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for (j, v) in vector.iter().enumerate() {
                components[[k, j]] = sign * v;
            }
            singular_values[k] = value.sqrt();
            rank += 1;
        }

        debug!(n_features, n_components, rank, "fitted truncated svd");

        Self {
            fit_id: fit_id.to_string(),
            fitted_at: Utc::now(),
            components,
            singular_values,
        }
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.singular_values.len() != self.components.nrows() {
            return Err(format!(
                "{} singular values for {} components",
                self.singular_values.len(),
                self.components.nrows()
            ));
        }
        if self.components.iter().any(|v| !v.is_finite()) {
            return Err("non-finite component weight".to_string());
        }
        Ok(())
    }

    /// Project a weighted term vector onto the components.
    pub fn transform(&self, weighted: &Array1<f64>) -> Array1<f64> {
        self.components.dot(weighted)
    }
}
