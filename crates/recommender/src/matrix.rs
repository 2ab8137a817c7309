//! User-item rating matrix
//!
//! Pivots review records into a dense users x items matrix. Rows and columns
//! follow first-seen order in the interaction list. Duplicate (user, item)
//! pairs are averaged; pairs that never interacted hold 0.0, which is a
//! "no signal" sentinel rather than a rating.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use yelp_recsys_core::{RecsysError, Result, Review};

/// Value stored for pairs with no interaction
pub const NO_RATING: f64 = 0.0;

/// Lowest and highest star rating a review can carry
pub const MIN_RATING: f32 = 1.0;
pub const MAX_RATING: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingMatrix {
    /// [num_users x num_items]
    values: Array2<f64>,
    user_ids: Vec<String>,
    item_ids: Vec<String>,
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
}

impl RatingMatrix {
    /// Build the matrix from review records
    pub fn from_reviews(reviews: &[Review]) -> Result<Self> {
        Self::from_interactions(
            reviews
                .iter()
                .map(|r| (r.user_id.as_str(), r.business_id.as_str(), r.stars)),
        )
    }

    /// Build the matrix from `(user_id, item_id, rating)` triples
    ///
    /// # Errors
    ///
    /// Returns a `Data` error if there are no interactions, or if one has an
    /// empty id or a rating outside [`MIN_RATING`, `MAX_RATING`].
    pub fn from_interactions<'a, I>(interactions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, f32)>,
    {
        let mut user_ids: Vec<String> = Vec::new();
        let mut item_ids: Vec<String> = Vec::new();
        let mut user_index: HashMap<String, usize> = HashMap::new();
        let mut item_index: HashMap<String, usize> = HashMap::new();
        // (user_idx, item_idx) -> (rating sum, count)
        let mut cells: HashMap<(usize, usize), (f64, u32)> = HashMap::new();

        for (position, (user_id, item_id, rating)) in interactions.into_iter().enumerate() {
            if user_id.is_empty() || item_id.is_empty() {
                return Err(RecsysError::data(format!(
                    "interaction {} has an empty user or item id",
                    position
                )));
            }
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(RecsysError::data(format!(
                    "interaction {} ({}, {}) has rating {} outside {}..={}",
                    position, user_id, item_id, rating, MIN_RATING, MAX_RATING
                )));
            }

            let user_idx = *user_index.entry(user_id.to_string()).or_insert_with(|| {
                user_ids.push(user_id.to_string());
                user_ids.len() - 1
            });
            let item_idx = *item_index.entry(item_id.to_string()).or_insert_with(|| {
                item_ids.push(item_id.to_string());
                item_ids.len() - 1
            });

            let cell = cells.entry((user_idx, item_idx)).or_insert((0.0, 0));
            cell.0 += rating as f64;
            cell.1 += 1;
        }

        if cells.is_empty() {
            return Err(RecsysError::data(
                "cannot build a rating matrix from an empty interaction set",
            ));
        }

        let mut values = Array2::<f64>::from_elem((user_ids.len(), item_ids.len()), NO_RATING);
        for ((u, i), (sum, count)) in cells {
            values[[u, i]] = sum / count as f64;
        }

        tracing::debug!(
            users = user_ids.len(),
            items = item_ids.len(),
            "Built rating matrix"
        );

        Ok(Self {
            values,
            user_ids,
            item_ids,
            user_index,
            item_index,
        })
    }

    /// (num_users, num_items)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn num_users(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    pub fn user_index(&self, user_id: &str) -> Result<usize> {
        self.user_index
            .get(user_id)
            .copied()
            .ok_or_else(|| RecsysError::user_not_found(user_id))
    }

    pub fn item_index(&self, item_id: &str) -> Result<usize> {
        self.item_index
            .get(item_id)
            .copied()
            .ok_or_else(|| RecsysError::item_not_found(item_id))
    }

    pub fn row(&self, user_idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(user_idx)
    }

    /// Mean rating for a pair, or `NO_RATING` if they never interacted
    pub fn get(&self, user_id: &str, item_id: &str) -> Result<f64> {
        let u = self.user_index(user_id)?;
        let i = self.item_index(item_id)?;
        Ok(self.values[[u, i]])
    }

    /// Number of cells holding an actual rating
    pub fn rated_cells(&self) -> usize {
        self.values.iter().filter(|&&v| v != NO_RATING).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_pairs_are_averaged() {
        let matrix = RatingMatrix::from_interactions(vec![
            ("u1", "i1", 5.0),
            ("u1", "i1", 3.0),
            ("u1", "i2", 4.0),
        ])
        .unwrap();

        assert_eq!(matrix.shape(), (1, 2));
        assert!((matrix.get("u1", "i1").unwrap() - 4.0).abs() < 1e-9);
        assert!((matrix.get("u1", "i2").unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_pairs_hold_sentinel() {
        let matrix = RatingMatrix::from_interactions(vec![
            ("u1", "i1", 1.0),
            ("u1", "i2", 2.0),
            ("u2", "i1", 3.0),
        ])
        .unwrap();

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.get("u2", "i2").unwrap(), NO_RATING);
        assert_eq!(matrix.rated_cells(), 3);
    }

    #[test]
    fn test_first_seen_order() {
        let matrix = RatingMatrix::from_interactions(vec![
            ("u2", "i3", 1.0),
            ("u1", "i1", 2.0),
            ("u2", "i1", 3.0),
        ])
        .unwrap();

        assert_eq!(matrix.user_ids(), &["u2".to_string(), "u1".to_string()]);
        assert_eq!(matrix.item_ids(), &["i3".to_string(), "i1".to_string()]);
        assert_eq!(matrix.user_index("u1").unwrap(), 1);
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_empty_interactions_fail() {
        let err = RatingMatrix::from_interactions(Vec::<(&str, &str, f32)>::new()).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_malformed_interactions_fail() {
        assert!(RatingMatrix::from_interactions(vec![("", "i1", 4.0)])
            .unwrap_err()
            .is_data());
        assert!(RatingMatrix::from_interactions(vec![("u1", "i1", f32::NAN)])
            .unwrap_err()
            .is_data());

        // 0 would be indistinguishable from an absent rating
        for rating in [0.0, -3.0, 0.5, 5.5, 9.0, f32::INFINITY] {
            let err = RatingMatrix::from_interactions(vec![("u1", "i1", 4.0), ("u1", "i2", rating)])
                .unwrap_err();
            assert!(err.is_data(), "rating {} was accepted", rating);
        }
    }

    #[test]
    fn test_rating_bounds_are_inclusive() {
        let matrix =
            RatingMatrix::from_interactions(vec![("u1", "i1", MIN_RATING), ("u1", "i2", MAX_RATING)])
                .unwrap();
        assert_eq!(matrix.get("u1", "i1").unwrap(), 1.0);
        assert_eq!(matrix.get("u1", "i2").unwrap(), 5.0);
        assert_eq!(matrix.rated_cells(), 2);
    }

    #[test]
    fn test_unknown_ids() {
        let matrix = RatingMatrix::from_interactions(vec![("u1", "i1", 4.0)]).unwrap();
        assert!(matrix.user_index("u9").unwrap_err().is_not_found());
        assert!(matrix.item_index("i9").unwrap_err().is_not_found());
    }

    #[test]
    fn test_from_reviews() {
        let reviews = vec![Review::new("u1", "b1", 5.0), Review::new("u2", "b1", 2.0)];
        let matrix = RatingMatrix::from_reviews(&reviews).unwrap();
        assert_eq!(matrix.shape(), (2, 1));
        assert_eq!(matrix.get("u2", "b1").unwrap(), 2.0);
    }
}
