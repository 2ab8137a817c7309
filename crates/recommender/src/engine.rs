//! Recommendation engine
//!
//! Owns the rating matrix and the active model strategy. Fitting is always
//! explicit: building the engine or switching strategy leaves the model
//! unfitted until `fit` is called.

use crate::matrix::RatingMatrix;
use crate::strategy::{Model, Recommender};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};
use yelp_recsys_core::{
    ConfigLoader, EngineConfig, InteractionStore, ModelType, RecsysError, Result,
};

/// Outcome of one user's request inside a batch
#[derive(Debug)]
pub struct UserRecommendations {
    pub user_id: String,
    pub result: Result<Vec<String>>,
}

impl UserRecommendations {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEngine {
    config: EngineConfig,
    matrix: RatingMatrix,
    model: Model,
}

impl RecommendationEngine {
    /// Wrap an existing matrix; the model starts unfitted
    pub fn new(matrix: RatingMatrix, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let model = Model::from_config(&config);
        Ok(Self {
            config,
            matrix,
            model,
        })
    }

    /// Build the matrix from the store's reviews
    pub fn build(store: &InteractionStore, config: EngineConfig) -> Result<Self> {
        let matrix = RatingMatrix::from_reviews(store.reviews())?;
        info!(
            users = matrix.num_users(),
            items = matrix.num_items(),
            rated_cells = matrix.rated_cells(),
            model_type = %config.model_type,
            "Built recommendation engine"
        );
        Self::new(matrix, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }

    /// Fail unless the active strategy is `expected`
    ///
    /// Guards a loaded model against a caller asking for the other strategy.
    pub fn ensure_model_type(&self, expected: ModelType) -> Result<()> {
        if self.model_type() != expected {
            return Err(RecsysError::config_key(
                format!(
                    "model is {} but {} was requested",
                    self.model_type(),
                    expected
                ),
                "RECSYS_MODEL_TYPE",
            ));
        }
        Ok(())
    }

    /// Fit the active strategy on the engine's matrix
    pub fn fit(&mut self) -> Result<()> {
        self.model.fit(&self.matrix)?;
        info!(
            model_type = %self.model_type(),
            users = self.matrix.num_users(),
            items = self.matrix.num_items(),
            "Fitted recommendation model"
        );
        Ok(())
    }

    /// Replace the active strategy with a fresh, unfitted one
    ///
    /// The matrix is untouched. Call `fit` before the next `recommend`.
    pub fn switch_model(&mut self, model_type: ModelType) {
        self.config.model_type = model_type;
        self.model = Model::from_config(&self.config);
        debug!(model_type = %model_type, "Switched model strategy");
    }

    /// Top-`n` item ids for `user_id`, best first
    ///
    /// `n` larger than the item count is clamped. Items the user already
    /// rated are not filtered out.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no interactions in the matrix
    /// - `Config` if `n` is 0 or the model has not been fitted
    pub fn recommend(&self, user_id: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Err(RecsysError::config_key(
                "recommendation count must be greater than 0",
                "RECSYS_RECOMMENDATION_COUNT",
            ));
        }

        let user_idx = self.matrix.user_index(user_id)?;

        if !self.model.is_fitted() {
            return Err(RecsysError::config(format!(
                "{} model is not fitted; call fit() first",
                self.model_type()
            )));
        }

        let n = n.min(self.matrix.num_items());
        let ranked = self.model.rank(self.matrix.row(user_idx), Some(user_idx))?;
        let item_ids = self.matrix.item_ids();

        let recommendations: Vec<String> = ranked
            .into_iter()
            .take(n)
            .map(|col| item_ids[col].clone())
            .collect();

        debug!(
            user_id,
            requested = n,
            returned = recommendations.len(),
            model_type = %self.model_type(),
            "Generated recommendations"
        );
        Ok(recommendations)
    }

    /// `recommend` for each user independently; one failure does not stop
    /// the rest
    pub fn recommend_batch<S: AsRef<str>>(
        &self,
        user_ids: &[S],
        n: usize,
    ) -> Vec<UserRecommendations> {
        let results: Vec<UserRecommendations> = user_ids
            .iter()
            .map(|user_id| {
                let user_id = user_id.as_ref();
                let result = self.recommend(user_id, n);
                if let Err(e) = &result {
                    warn!(user_id, error = %e, "Recommendation failed");
                }
                UserRecommendations {
                    user_id: user_id.to_string(),
                    result,
                }
            })
            .collect();

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(
            users = results.len(),
            failed,
            model_type = %self.model_type(),
            "Batch recommendation finished"
        );
        results
    }

    /// Write the engine (configuration, matrix and model) to `path`
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        info!(
            path = %path.display(),
            model_type = %self.model_type(),
            fitted = self.is_fitted(),
            "Saved model"
        );
        Ok(())
    }

    /// Read an engine written by `save_model`
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let engine: Self = bincode::deserialize_from(reader)?;
        if engine.model_type() != engine.config.model_type {
            return Err(RecsysError::data(format!(
                "{}: model is {} but configuration says {}",
                path.display(),
                engine.model_type(),
                engine.config.model_type
            )));
        }
        info!(path = %path.display(), model_type = %engine.model_type(), "Loaded model");
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_engine(model_type: ModelType) -> RecommendationEngine {
        let matrix = RatingMatrix::from_interactions(vec![
            ("u1", "i1", 5.0),
            ("u1", "i2", 4.0),
            ("u2", "i1", 4.0),
            ("u2", "i2", 5.0),
            ("u2", "i3", 2.0),
            ("u3", "i3", 5.0),
            ("u3", "i4", 4.0),
            ("u4", "i4", 5.0),
            ("u4", "i5", 3.0),
        ])
        .unwrap();
        let config = EngineConfig {
            model_type,
            latent_rank: 2,
            neighbor_count: 2,
            ..Default::default()
        };
        RecommendationEngine::new(matrix, config).unwrap()
    }

    #[test]
    fn test_recommend_requires_fit() {
        let engine = sample_engine(ModelType::Factorization);
        assert!(!engine.is_fitted());
        assert!(engine.recommend("u1", 3).unwrap_err().is_config());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let mut engine = sample_engine(ModelType::Factorization);
        engine.fit().unwrap();
        assert!(engine.recommend("unknown_user", 5).unwrap_err().is_not_found());
    }

    #[test]
    fn test_recommend_returns_unique_known_items() {
        for model_type in [ModelType::Factorization, ModelType::NearestNeighbor] {
            let mut engine = sample_engine(model_type);
            engine.fit().unwrap();

            for user in ["u1", "u2", "u3", "u4"] {
                let recs = engine.recommend(user, 3).unwrap();
                assert!(recs.len() <= 3);
                let unique: HashSet<&String> = recs.iter().collect();
                assert_eq!(unique.len(), recs.len());
                for item in &recs {
                    assert!(engine.matrix().item_index(item).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_n_is_clamped_to_item_count() {
        let mut engine = sample_engine(ModelType::Factorization);
        engine.fit().unwrap();
        assert_eq!(engine.recommend("u1", 50).unwrap().len(), 5);
        assert!(engine.recommend("u1", 0).unwrap_err().is_config());
    }

    #[test]
    fn test_switch_model_keeps_matrix_and_needs_refit() {
        let mut engine = sample_engine(ModelType::Factorization);
        engine.fit().unwrap();
        let before = engine.matrix().clone();

        engine.switch_model(ModelType::NearestNeighbor);
        assert_eq!(engine.model_type(), ModelType::NearestNeighbor);
        assert!(!engine.is_fitted());
        assert!(engine.recommend("u1", 3).is_err());

        engine.fit().unwrap();
        assert!(engine.recommend("u1", 3).is_ok());
        assert_eq!(engine.matrix(), &before);
    }

    #[test]
    fn test_ensure_model_type() {
        let mut engine = sample_engine(ModelType::Factorization);
        assert!(engine.ensure_model_type(ModelType::Factorization).is_ok());
        assert!(engine
            .ensure_model_type(ModelType::NearestNeighbor)
            .unwrap_err()
            .is_config());

        engine.switch_model(ModelType::NearestNeighbor);
        assert!(engine.ensure_model_type(ModelType::NearestNeighbor).is_ok());
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut engine = sample_engine(ModelType::NearestNeighbor);
        engine.fit().unwrap();

        let results = engine.recommend_batch(&["u1", "ghost", "u3"], 2);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].result.as_ref().unwrap_err().is_not_found());
        assert!(results[2].is_ok());
        assert_eq!(results[1].user_id, "ghost");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let matrix = RatingMatrix::from_interactions(vec![("u1", "i1", 5.0)]).unwrap();
        let config = EngineConfig {
            latent_rank: 0,
            ..Default::default()
        };
        assert!(RecommendationEngine::new(matrix, config).unwrap_err().is_config());
    }

    #[test]
    fn test_rank_too_large_for_matrix() {
        let engine = sample_engine(ModelType::Factorization);
        let config = EngineConfig {
            latent_rank: 10,
            ..engine.config().clone()
        };
        let mut engine = RecommendationEngine::new(engine.matrix().clone(), config).unwrap();
        assert!(engine.fit().unwrap_err().is_config());
    }
}
