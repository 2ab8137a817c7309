//! User records

use serde::{Deserialize, Serialize};

/// A reviewer on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub user_id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Number of reviews written
    #[serde(default)]
    pub review_count: u32,

    /// Mean star rating across all of the user's reviews
    #[serde(default)]
    pub average_stars: f32,

    /// Number of fans
    #[serde(default)]
    pub fans: u32,

    /// "Useful" votes sent by the user
    #[serde(default)]
    pub useful: u64,

    /// "Funny" votes sent by the user
    #[serde(default)]
    pub funny: u64,

    /// "Cool" votes sent by the user
    #[serde(default)]
    pub cool: u64,
}

impl User {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            review_count: 0,
            average_stars: 0.0,
            fans: 0,
            useful: 0,
            funny: 0,
            cool: 0,
        }
    }

    /// Total votes sent across all vote kinds
    pub fn total_votes(&self) -> u64 {
        self.useful + self.funny + self.cool
    }
}
