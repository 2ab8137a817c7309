//! Category-overlap relevance heuristic
//!
//! A user's preferred categories are the most frequent categories among the
//! businesses they rated at or above the positive threshold. A recommended
//! business counts as relevant when one of its categories is contained in
//! one of those preferred category strings. Containment, not equality: "Spa"
//! matches "Day Spas". This is a rough proxy for relevance, not ground truth.

use std::collections::{HashMap, HashSet};
use tracing::warn;
use yelp_recsys_core::{InteractionStore, Result};

/// Preferred categories per user when the caller does not choose
/// (`recsys evaluate --top-k`)
pub const DEFAULT_TOP_CATEGORIES: usize = 5;

/// Default minimum stars for a review to count as positive
pub const DEFAULT_POSITIVE_THRESHOLD: f32 = 4.0;

/// True iff some item category is a substring of (or equal to) some top
/// category
pub fn is_relevant<A, B>(item_categories: &[A], top_categories: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    top_categories.iter().any(|top| {
        item_categories
            .iter()
            .any(|category| top.as_ref().contains(category.as_ref()))
    })
}

pub struct RelevanceEvaluator<'a> {
    store: &'a InteractionStore,
    positive_threshold: f32,
}

impl<'a> RelevanceEvaluator<'a> {
    pub fn new(store: &'a InteractionStore) -> Self {
        Self {
            store,
            positive_threshold: DEFAULT_POSITIVE_THRESHOLD,
        }
    }

    pub fn with_positive_threshold(mut self, threshold: f32) -> Self {
        self.positive_threshold = threshold;
        self
    }

    pub fn positive_threshold(&self) -> f32 {
        self.positive_threshold
    }

    /// The `k` most frequent categories among the user's positive reviews
    ///
    /// Each qualifying review adds one count to each distinct category of its
    /// business. Equal counts keep first-seen order. A user without positive
    /// reviews gets an empty list. Reviews of businesses missing from the
    /// metadata table are skipped.
    pub fn top_categories(&self, user_id: &str, k: usize) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();

        for review in self.store.reviews_by(user_id) {
            if review.stars < self.positive_threshold {
                continue;
            }

            let categories = match self.store.business_categories(&review.business_id) {
                Ok(categories) => categories,
                Err(e) => {
                    warn!(user_id, business_id = %review.business_id, error = %e, "Skipping review of unknown business");
                    continue;
                }
            };

            let mut counted = HashSet::new();
            for category in categories {
                let category = category.as_str();
                if !counted.insert(category) {
                    continue;
                }
                let count = counts.entry(category).or_insert_with(|| {
                    first_seen.push(category);
                    0
                });
                *count += 1;
            }
        }

        // Stable sort keeps first-seen order among equal counts
        first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
        first_seen
            .into_iter()
            .take(k)
            .map(str::to_string)
            .collect()
    }

    /// Whether a business's categories overlap `top_categories`
    pub fn is_business_relevant<S: AsRef<str>>(
        &self,
        business_id: &str,
        top_categories: &[S],
    ) -> Result<bool> {
        let categories = self.store.business_categories(business_id)?;
        Ok(is_relevant(categories, top_categories))
    }

    /// Fraction of `recommendations` judged relevant to `user_id`
    ///
    /// Uses the user's `top_k` preferred categories. Returns `None` for an
    /// empty recommendation list, where precision is undefined.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a recommended business is missing from the
    /// metadata table.
    pub fn precision_at_n<S: AsRef<str>>(
        &self,
        user_id: &str,
        recommendations: &[S],
        top_k: usize,
    ) -> Result<Option<f64>> {
        if recommendations.is_empty() {
            return Ok(None);
        }

        let top = self.top_categories(user_id, top_k);
        let mut relevant = 0usize;
        for business_id in recommendations {
            if self.is_business_relevant(business_id.as_ref(), &top)? {
                relevant += 1;
            }
        }

        Ok(Some(relevant as f64 / recommendations.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yelp_recsys_core::{Business, Review, User};

    fn sample_store() -> InteractionStore {
        InteractionStore::new(
            vec![User::new("u1", "Bill")],
            vec![
                Business::new("i1", "Tony's").with_categories(["Pizza"]),
                Business::new("i2", "Zen Spa").with_categories(["Spa"]),
                Business::new("i3", "Deli").with_categories(["Restaurants", "Sandwiches"]),
                Business::new("i4", "Trattoria").with_categories(["Restaurants", "Pizza"]),
                Business::new("i5", "Nail Bar").with_categories(["Beauty & Spas"]),
            ],
            vec![
                Review::new("u1", "i1", 5.0),
                Review::new("u1", "i2", 1.0),
                Review::new("u1", "i3", 4.0),
                Review::new("u1", "i4", 4.5),
                Review::new("u1", "gone", 5.0),
            ],
        )
    }

    #[test]
    fn test_top_categories_excludes_low_ratings() {
        let store = InteractionStore::new(
            vec![User::new("u1", "Bill")],
            vec![
                Business::new("i1", "Tony's").with_categories(["Pizza"]),
                Business::new("i2", "Zen Spa").with_categories(["Spa"]),
            ],
            vec![Review::new("u1", "i1", 5.0), Review::new("u1", "i2", 1.0)],
        );
        let evaluator = RelevanceEvaluator::new(&store);
        assert_eq!(evaluator.top_categories("u1", 1), vec!["Pizza"]);
        assert_eq!(evaluator.top_categories("u1", 5), vec!["Pizza"]);
    }

    #[test]
    fn test_top_categories_counts_and_ties() {
        let store = sample_store();
        let evaluator = RelevanceEvaluator::new(&store);

        // Pizza: 2, Restaurants: 2, Sandwiches: 1; Pizza seen first
        assert_eq!(
            evaluator.top_categories("u1", 3),
            vec!["Pizza", "Restaurants", "Sandwiches"]
        );
        assert_eq!(evaluator.top_categories("u1", 1), vec!["Pizza"]);
        assert!(evaluator.top_categories("nobody", 3).is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let store = sample_store();
        let evaluator = RelevanceEvaluator::new(&store).with_positive_threshold(1.0);
        assert!(evaluator
            .top_categories("u1", 10)
            .contains(&"Spa".to_string()));
    }

    #[test]
    fn test_is_relevant_uses_containment() {
        let top = ["Beauty & Spas", "Pizza"];
        assert!(is_relevant(&["Spa"], &top));
        assert!(is_relevant(&["Pizza", "Bars"], &top));
        assert!(!is_relevant(&["Hotels & Travel"], &top));
        assert!(!is_relevant::<&str, &str>(&[], &top));
        // containment is one-way
        assert!(!is_relevant(&["Day Spas"], &["Spa"]));
    }

    #[test]
    fn test_precision_at_n() {
        let store = sample_store();
        let evaluator = RelevanceEvaluator::new(&store);

        let precision = evaluator
            .precision_at_n("u1", &["i1", "i2", "i3", "i5"], DEFAULT_TOP_CATEGORIES)
            .unwrap()
            .unwrap();
        // i1 (Pizza) and i3 (Restaurants) are relevant; i2 "Spa" and i5 are not
        assert!((precision - 0.5).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&precision));
    }

    #[test]
    fn test_precision_empty_and_unknown() {
        let store = sample_store();
        let evaluator = RelevanceEvaluator::new(&store);

        assert_eq!(
            evaluator.precision_at_n::<&str>("u1", &[], 5).unwrap(),
            None
        );
        assert!(evaluator
            .precision_at_n("u1", &["missing"], 5)
            .unwrap_err()
            .is_not_found());
    }
}
