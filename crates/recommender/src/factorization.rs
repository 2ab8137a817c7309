//! Truncated SVD recommender
//!
//! Decomposes the rating matrix X (users x items) into its top-k right
//! singular vectors V (k x items). A user row x is scored by projecting into
//! the latent space and reconstructing: x_hat = (x V^T) V. Scores are only
//! meaningful relative to each other.

use crate::matrix::RatingMatrix;
use crate::strategy::Recommender;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use yelp_recsys_core::{ModelType, RecsysError, Result};

/// Below this a singular value is treated as zero
const SINGULAR_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruncatedSvd {
    latent_rank: usize,
    /// Right singular vectors: [latent_rank x num_items]
    components: Option<Array2<f64>>,
    /// Top singular values, descending
    singular_values: Option<Array1<f64>>,
    /// Squared Frobenius norm of the fitted matrix
    total_energy: f64,
}

impl TruncatedSvd {
    pub fn new(latent_rank: usize) -> Self {
        Self {
            latent_rank,
            components: None,
            singular_values: None,
            total_energy: 0.0,
        }
    }

    pub fn latent_rank(&self) -> usize {
        self.latent_rank
    }

    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    pub fn singular_values(&self) -> Option<&Array1<f64>> {
        self.singular_values.as_ref()
    }

    /// Share of the matrix's squared norm captured by each factor
    pub fn explained_variance_ratio(&self) -> Option<Array1<f64>> {
        let singular_values = self.singular_values.as_ref()?;
        if self.total_energy <= 0.0 {
            return Some(Array1::zeros(singular_values.len()));
        }
        Some(singular_values.mapv(|s| s * s / self.total_energy))
    }

    /// Project a user row into the latent space
    pub fn transform(&self, user_row: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let components = self.fitted_components()?;
        if user_row.len() != components.ncols() {
            return Err(RecsysError::data(format!(
                "user row has {} items but the model was fitted on {}",
                user_row.len(),
                components.ncols()
            )));
        }
        Ok(components.dot(&user_row))
    }

    /// Reconstructed score for every item column
    pub fn predict(&self, user_row: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let latent = self.transform(user_row)?;
        Ok(self.fitted_components()?.t().dot(&latent))
    }

    fn fitted_components(&self) -> Result<&Array2<f64>> {
        self.components
            .as_ref()
            .ok_or_else(|| RecsysError::config("factorization model is not fitted"))
    }

    /// Top-k right singular vectors and values of `x`
    ///
    /// Works on whichever Gram matrix is smaller: X^T X gives V directly,
    /// X X^T gives U and V follows from v = X^T u / sigma.
    fn decompose(x: &Array2<f64>, k: usize) -> (Array2<f64>, Array1<f64>) {
        let (num_users, num_items) = x.dim();
        let mut components = Array2::<f64>::zeros((k, num_items));
        let mut singular_values = Array1::<f64>::zeros(k);

        if num_items <= num_users {
            let (eigenvalues, eigenvectors) = top_eigenpairs(&x.t().dot(x), k);
            for f in 0..k {
                singular_values[f] = eigenvalues[f].max(0.0).sqrt();
                components.row_mut(f).assign(&eigenvectors.column(f));
            }
        } else {
            let (eigenvalues, eigenvectors) = top_eigenpairs(&x.dot(&x.t()), k);
            for f in 0..k {
                let sigma = eigenvalues[f].max(0.0).sqrt();
                singular_values[f] = sigma;
                if sigma > SINGULAR_EPSILON {
                    let v = x.t().dot(&eigenvectors.column(f)) / sigma;
                    components.row_mut(f).assign(&v);
                }
            }
        }

        // Fix the sign of each factor so its largest-magnitude entry is positive
        for mut row in components.axis_iter_mut(Axis(0)) {
            let pivot = row
                .iter()
                .copied()
                .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(Ordering::Equal))
                .unwrap_or(0.0);
            if pivot < 0.0 {
                row.mapv_inplace(|v| -v);
            }
        }

        (components, singular_values)
    }
}

/// The `k` largest eigenvalues of a symmetric matrix, descending, with their
/// unit eigenvectors as columns
fn top_eigenpairs(gram: &Array2<f64>, k: usize) -> (Array1<f64>, Array2<f64>) {
    let n = gram.nrows();
    let eigen = SymmetricEigen::new(DMatrix::from_fn(n, n, |i, j| gram[[i, j]]));

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
    order.truncate(k);

    let eigenvalues = Array1::from_iter(order.iter().map(|&i| eigen.eigenvalues[i]));
    let eigenvectors =
        Array2::from_shape_fn((n, order.len()), |(row, col)| eigen.eigenvectors[(row, order[col])]);
    (eigenvalues, eigenvectors)
}

impl Recommender for TruncatedSvd {
    fn model_type(&self) -> ModelType {
        ModelType::Factorization
    }

    fn is_fitted(&self) -> bool {
        self.components.is_some()
    }

    /// # Errors
    ///
    /// Returns a `Config` error unless 1 <= latent_rank <= min(users, items) - 1.
    fn fit(&mut self, matrix: &RatingMatrix) -> Result<()> {
        let (num_users, num_items) = matrix.shape();
        let max_rank = num_users.min(num_items).saturating_sub(1);
        if self.latent_rank == 0 || self.latent_rank > max_rank {
            return Err(RecsysError::config_key(
                format!(
                    "latent_rank ({}) must be between 1 and {} for a {}x{} matrix",
                    self.latent_rank, max_rank, num_users, num_items
                ),
                "RECSYS_LATENT_RANK",
            ));
        }

        let x = matrix.values();
        let (components, singular_values) = Self::decompose(x, self.latent_rank);

        self.total_energy = x.iter().map(|v| v * v).sum();
        tracing::debug!(
            latent_rank = self.latent_rank,
            top_singular_value = singular_values[0],
            "Fitted truncated SVD"
        );

        self.components = Some(components);
        self.singular_values = Some(singular_values);
        Ok(())
    }

    /// All item columns ordered by descending reconstructed score; ties keep
    /// column order.
    fn rank(&self, user_row: ArrayView1<'_, f64>, _user_idx: Option<usize>) -> Result<Vec<usize>> {
        let scores = self.predict(user_row)?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });
        Ok(order)
    }
}
