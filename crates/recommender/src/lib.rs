//! Collaborative-filtering recommender for review-platform data
//!
//! Builds a dense user-item rating matrix from reviews, fits one of two
//! interchangeable strategies over it (truncated SVD or cosine k-nearest
//! neighbors), and ranks businesses for a user. A category-overlap
//! heuristic scores the results so the strategies can be compared offline.

pub mod engine;
pub mod evaluation;
pub mod factorization;
pub mod linalg;
pub mod matrix;
pub mod neighbors;
pub mod relevance;
pub mod strategy;

// Re-export key types
pub use engine::{RecommendationEngine, UserRecommendations};
pub use evaluation::{
    compare_models, compare_strategies, evaluate_strategy, jaccard, model_agreement,
    sample_users, ModelAgreement, StrategyEvaluation, ALL_MODEL_TYPES,
};
pub use factorization::TruncatedSvd;
pub use matrix::{RatingMatrix, MAX_RATING, MIN_RATING, NO_RATING};
pub use neighbors::{NearestNeighbors, Neighbor};
pub use relevance::{is_relevant, RelevanceEvaluator, DEFAULT_TOP_CATEGORIES};
pub use strategy::{Model, Recommender};
