//! In-memory interaction store
//!
//! Holds the user, business and review snapshots the engine works from, with
//! id lookups. Snapshots are loaded once and never mutated.

use crate::config::DataConfig;
use crate::error::{RecsysError, Result};
use crate::models::{Business, Review, User};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct InteractionStore {
    users: Vec<User>,
    businesses: Vec<Business>,
    reviews: Vec<Review>,
    user_index: HashMap<String, usize>,
    business_index: HashMap<String, usize>,
}

impl InteractionStore {
    /// Build a store from already-loaded snapshots
    ///
    /// Later duplicates of a user or business id shadow earlier ones in
    /// lookups.
    pub fn new(users: Vec<User>, businesses: Vec<Business>, reviews: Vec<Review>) -> Self {
        let user_index = users
            .iter()
            .enumerate()
            .map(|(idx, u)| (u.user_id.clone(), idx))
            .collect();
        let business_index = businesses
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.business_id.clone(), idx))
            .collect();

        Self {
            users,
            businesses,
            reviews,
            user_index,
            business_index,
        }
    }

    /// Load the three JSON-lines snapshots named by `config`
    pub fn load(config: &DataConfig) -> Result<Self> {
        let users: Vec<User> = read_json_lines(config.users_path())?;
        let businesses: Vec<Business> = read_json_lines(config.businesses_path())?;
        let reviews: Vec<Review> = read_json_lines(config.reviews_path())?;

        info!(
            users = users.len(),
            businesses = businesses.len(),
            reviews = reviews.len(),
            data_dir = %config.data_dir.display(),
            "Loaded dataset snapshots"
        );

        Ok(Self::new(users, businesses, reviews))
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn user(&self, user_id: &str) -> Result<&User> {
        self.user_index
            .get(user_id)
            .map(|&idx| &self.users[idx])
            .ok_or_else(|| RecsysError::user_not_found(user_id))
    }

    pub fn business(&self, business_id: &str) -> Result<&Business> {
        self.business_index
            .get(business_id)
            .map(|&idx| &self.businesses[idx])
            .ok_or_else(|| RecsysError::item_not_found(business_id))
    }

    pub fn business_categories(&self, business_id: &str) -> Result<&[String]> {
        self.business(business_id).map(|b| b.categories.as_slice())
    }

    /// Reviews written by `user_id`, in snapshot order
    pub fn reviews_by<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Review> + 'a {
        self.reviews.iter().filter(move |r| r.user_id == user_id)
    }

    /// Number of distinct category labels across all businesses
    pub fn distinct_category_count(&self) -> usize {
        self.businesses
            .iter()
            .flat_map(|b| b.categories.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Read one JSON record per line, skipping blank lines
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be read, and a `Data` error
/// naming the line number for a record that does not parse.
pub fn read_json_lines<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str(&line).map_err(|e| {
            RecsysError::data(format!(
                "{}:{}: malformed record: {}",
                path.display(),
                line_no + 1,
                e
            ))
        })?;
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "Read JSON lines");
    Ok(records)
}
