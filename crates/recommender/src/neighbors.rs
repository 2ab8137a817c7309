//! Brute-force cosine k-nearest-neighbor recommender
//!
//! Keeps a copy of every user row. A query is compared against all of them
//! (cosine distance = 1 - cosine similarity), the k closest other users are
//! taken nearest first, and the items those neighbors rated become the
//! candidates.

use crate::linalg::cosine_similarity;
use crate::matrix::{RatingMatrix, NO_RATING};
use crate::strategy::Recommender;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use yelp_recsys_core::{ModelType, RecsysError, Result};

/// Distances closer than this count as a tie and fall back to row order
const DISTANCE_RESOLUTION: f64 = 1e-9;

/// A neighboring user and its cosine distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestNeighbors {
    neighbor_count: usize,
    /// Indexed user rows: [num_users x num_items]
    rows: Option<Array2<f64>>,
}

impl NearestNeighbors {
    pub fn new(neighbor_count: usize) -> Self {
        Self {
            neighbor_count,
            rows: None,
        }
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    /// The k indexed rows closest to `query`, nearest first
    ///
    /// `exclude` drops one row (the querying user) from the search. Distances
    /// within `DISTANCE_RESOLUTION` of each other keep row order.
    pub fn kneighbors(
        &self,
        query: ArrayView1<'_, f64>,
        exclude: Option<usize>,
    ) -> Result<Vec<Neighbor>> {
        let rows = self
            .rows
            .as_ref()
            .ok_or_else(|| RecsysError::config("nearest-neighbor model is not fitted"))?;
        if query.len() != rows.ncols() {
            return Err(RecsysError::data(format!(
                "user row has {} items but the model was fitted on {}",
                query.len(),
                rows.ncols()
            )));
        }

        let mut neighbors: Vec<Neighbor> = rows
            .outer_iter()
            .enumerate()
            .filter(|(row, _)| Some(*row) != exclude)
            .map(|(row, values)| Neighbor {
                row,
                distance: 1.0 - cosine_similarity(query, values),
            })
            .collect();

        // Stable sort on a quantized key so rounding noise cannot reorder ties
        neighbors.sort_by_key(|n| (n.distance / DISTANCE_RESOLUTION).round() as i64);
        neighbors.truncate(self.neighbor_count);
        Ok(neighbors)
    }
}

impl Recommender for NearestNeighbors {
    fn model_type(&self) -> ModelType {
        ModelType::NearestNeighbor
    }

    fn is_fitted(&self) -> bool {
        self.rows.is_some()
    }

    /// # Errors
    ///
    /// Returns a `Config` error unless 1 <= neighbor_count <= users - 1.
    fn fit(&mut self, matrix: &RatingMatrix) -> Result<()> {
        let max_neighbors = matrix.num_users().saturating_sub(1);
        if self.neighbor_count == 0 || self.neighbor_count > max_neighbors {
            return Err(RecsysError::config_key(
                format!(
                    "neighbor_count ({}) must be between 1 and {} for {} users",
                    self.neighbor_count,
                    max_neighbors,
                    matrix.num_users()
                ),
                "RECSYS_NEIGHBOR_COUNT",
            ));
        }

        self.rows = Some(matrix.values().clone());
        tracing::debug!(
            neighbor_count = self.neighbor_count,
            indexed_users = matrix.num_users(),
            "Fitted nearest-neighbor index"
        );
        Ok(())
    }

    /// Items rated by the nearest neighbors
    ///
    /// Walks neighbors nearest first; within a neighbor, items go by that
    /// neighbor's rating, highest first, then column order. Each item appears
    /// once, at its first occurrence. May return fewer items than exist.
    fn rank(&self, user_row: ArrayView1<'_, f64>, user_idx: Option<usize>) -> Result<Vec<usize>> {
        let neighbors = self.kneighbors(user_row, user_idx)?;
        let rows = match self.rows.as_ref() {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for neighbor in neighbors {
            let ratings = rows.row(neighbor.row);
            let mut rated: Vec<usize> = (0..ratings.len())
                .filter(|&col| ratings[col] != NO_RATING)
                .collect();
            rated.sort_by(|&a, &b| {
                ratings[b]
                    .partial_cmp(&ratings[a])
                    .unwrap_or(Ordering::Equal)
            });

            for col in rated {
                if seen.insert(col) {
                    candidates.push(col);
                }
            }
        }

        Ok(candidates)
    }
}
