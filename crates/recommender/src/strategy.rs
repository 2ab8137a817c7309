//! Model strategy: the shared fit/rank contract and the two variants

use crate::factorization::TruncatedSvd;
use crate::matrix::RatingMatrix;
use crate::neighbors::NearestNeighbors;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use yelp_recsys_core::{EngineConfig, ModelType, Result};

/// A collaborative-filtering model over a rating matrix
///
/// `fit` needs exclusive access; `rank` only reads the fitted state, so a
/// fitted model can serve any number of rank calls.
pub trait Recommender {
    fn model_type(&self) -> ModelType;

    fn is_fitted(&self) -> bool;

    fn fit(&mut self, matrix: &RatingMatrix) -> Result<()>;

    /// Candidate item columns for a user row, best first
    ///
    /// `user_idx` is the row's own index in the fitted matrix, when known.
    fn rank(&self, user_row: ArrayView1<'_, f64>, user_idx: Option<usize>) -> Result<Vec<usize>>;
}

/// The active strategy, selected by `ModelType`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Model {
    Factorization(TruncatedSvd),
    NearestNeighbor(NearestNeighbors),
}

impl Model {
    /// A fresh, unfitted model of `config.model_type`
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.model_type {
            ModelType::Factorization => Model::Factorization(TruncatedSvd::new(config.latent_rank)),
            ModelType::NearestNeighbor => {
                Model::NearestNeighbor(NearestNeighbors::new(config.neighbor_count))
            }
        }
    }

    fn inner(&self) -> &dyn Recommender {
        match self {
            Model::Factorization(svd) => svd,
            Model::NearestNeighbor(knn) => knn,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Recommender {
        match self {
            Model::Factorization(svd) => svd,
            Model::NearestNeighbor(knn) => knn,
        }
    }
}

impl Recommender for Model {
    fn model_type(&self) -> ModelType {
        self.inner().model_type()
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn fit(&mut self, matrix: &RatingMatrix) -> Result<()> {
        self.inner_mut().fit(matrix)
    }

    fn rank(&self, user_row: ArrayView1<'_, f64>, user_idx: Option<usize>) -> Result<Vec<usize>> {
        self.inner().rank(user_row, user_idx)
    }
}
