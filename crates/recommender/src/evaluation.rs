//! Offline comparison of the two strategies
//!
//! Precision is averaged over a user sample with the category heuristic
//! from `relevance`; agreement is the mean Jaccard overlap between the
//! lists each strategy produces for the same users.

use crate::engine::{RecommendationEngine, UserRecommendations};
use crate::relevance::RelevanceEvaluator;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};
use yelp_recsys_core::{InteractionStore, ModelType, Result};

/// Both strategies, in the order they are compared
pub const ALL_MODEL_TYPES: [ModelType; 2] = [ModelType::Factorization, ModelType::NearestNeighbor];

/// Up to `n` distinct user ids drawn from the store, reproducible by `seed`
pub fn sample_users(store: &InteractionStore, n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    store
        .users()
        .choose_multiple(&mut rng, n)
        .map(|user| user.user_id.clone())
        .collect()
}

/// Mean precision of one strategy over a user sample
#[derive(Debug, Clone, Serialize)]
pub struct StrategyEvaluation {
    pub model_type: ModelType,
    pub users_evaluated: usize,
    /// Users whose recommendation or precision failed or was undefined
    pub users_skipped: usize,
    pub mean_precision: Option<f64>,
    pub per_user: Vec<(String, f64)>,
}

/// Precision@N of the engine's current (fitted) strategy over `users`
pub fn evaluate_strategy<S: AsRef<str>>(
    engine: &RecommendationEngine,
    evaluator: &RelevanceEvaluator<'_>,
    users: &[S],
    n: usize,
    top_k: usize,
) -> StrategyEvaluation {
    let mut per_user = Vec::with_capacity(users.len());
    let mut users_skipped = 0;

    for batch in engine.recommend_batch(users, n) {
        let recommendations = match batch.result {
            Ok(recommendations) => recommendations,
            Err(_) => {
                users_skipped += 1;
                continue;
            }
        };

        match evaluator.precision_at_n(&batch.user_id, &recommendations, top_k) {
            Ok(Some(precision)) => per_user.push((batch.user_id, precision)),
            Ok(None) => {
                debug!(user_id = %batch.user_id, "No recommendations to score");
                users_skipped += 1;
            }
            Err(e) => {
                debug!(user_id = %batch.user_id, error = %e, "Precision failed");
                users_skipped += 1;
            }
        }
    }

    let mean_precision = mean(per_user.iter().map(|(_, p)| *p));
    let evaluation = StrategyEvaluation {
        model_type: engine.model_type(),
        users_evaluated: per_user.len(),
        users_skipped,
        mean_precision,
        per_user,
    };

    info!(
        model_type = %evaluation.model_type,
        users_evaluated = evaluation.users_evaluated,
        users_skipped = evaluation.users_skipped,
        mean_precision = ?evaluation.mean_precision,
        "Evaluated strategy"
    );
    evaluation
}

/// Fit and evaluate every strategy on the same users
///
/// Fitting happens on a copy, so `engine` keeps its current strategy and
/// fitted state even when one of the fits fails.
pub fn compare_strategies<S: AsRef<str>>(
    engine: &RecommendationEngine,
    evaluator: &RelevanceEvaluator<'_>,
    users: &[S],
    n: usize,
    top_k: usize,
) -> Result<Vec<StrategyEvaluation>> {
    let mut scratch = engine.clone();
    let mut evaluations = Vec::with_capacity(ALL_MODEL_TYPES.len());

    for model_type in ALL_MODEL_TYPES {
        scratch.switch_model(model_type);
        scratch.fit()?;
        evaluations.push(evaluate_strategy(&scratch, evaluator, users, n, top_k));
    }

    Ok(evaluations)
}

/// |A ∩ B| / |A ∪ B|; `None` when both lists are empty
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> Option<f64> {
    let a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return None;
    }
    let intersection = a.intersection(&b).count();
    Some(intersection as f64 / union as f64)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelAgreement {
    pub users_compared: usize,
    pub mean_jaccard: Option<f64>,
}

/// Mean Jaccard overlap between two batches of recommendations
///
/// Entries are paired by user id; a user counts only when both strategies
/// produced a non-empty result for them.
pub fn model_agreement(
    svd_recs: &[UserRecommendations],
    knn_recs: &[UserRecommendations],
) -> ModelAgreement {
    let overlaps: Vec<f64> = svd_recs
        .iter()
        .filter_map(|svd| {
            let knn = knn_recs.iter().find(|knn| knn.user_id == svd.user_id)?;
            match (&svd.result, &knn.result) {
                (Ok(a), Ok(b)) => jaccard(a.as_slice(), b.as_slice()),
                _ => None,
            }
        })
        .collect();

    ModelAgreement {
        users_compared: overlaps.len(),
        mean_jaccard: mean(overlaps.iter().copied()),
    }
}

/// Fit both strategies and measure how much their top-`n` lists overlap
///
/// Like `compare_strategies`, this works on a copy of `engine`.
pub fn compare_models<S: AsRef<str>>(
    engine: &RecommendationEngine,
    users: &[S],
    n: usize,
) -> Result<ModelAgreement> {
    let mut scratch = engine.clone();

    scratch.switch_model(ModelType::Factorization);
    scratch.fit()?;
    let svd_recs = scratch.recommend_batch(users, n);

    scratch.switch_model(ModelType::NearestNeighbor);
    scratch.fit()?;
    let knn_recs = scratch.recommend_batch(users, n);

    let agreement = model_agreement(&svd_recs, &knn_recs);
    info!(
        users_compared = agreement.users_compared,
        mean_jaccard = ?agreement.mean_jaccard,
        "Compared strategies"
    );
    Ok(agreement)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
