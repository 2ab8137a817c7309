//! Review (interaction) records

use serde::{Deserialize, Serialize};

/// One star rating given by a user to a business
///
/// A user may review the same business more than once; the matrix builder
/// averages such pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub review_id: Option<String>,
    pub user_id: String,
    pub business_id: String,
    /// Star rating in [1, 5]
    pub stars: f32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl Review {
    pub fn new(user_id: impl Into<String>, business_id: impl Into<String>, stars: f32) -> Self {
        Self {
            review_id: None,
            user_id: user_id.into(),
            business_id: business_id.into(),
            stars,
            text: None,
            date: None,
        }
    }
}
