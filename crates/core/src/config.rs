//! Configuration loading for the recommender
//!
//! All options are read from environment variables with the `RECSYS_` prefix,
//! optionally seeded from a `.env` file. Override hierarchy:
//! defaults < .env < environment < command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use yelp_recsys_core::config::{load_dotenv, ConfigLoader, DataConfig, EngineConfig};
//!
//! # fn example() -> yelp_recsys_core::Result<()> {
//! load_dotenv();
//!
//! let engine_config = EngineConfig::from_env()?;
//! let data_config = DataConfig::from_env()?;
//!
//! engine_config.validate()?;
//! data_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{RecsysError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration loader trait
///
/// Standard way to build a configuration struct from the environment and
/// check it before use.
pub trait ConfigLoader: Sized {
    /// Load configuration from `RECSYS_*` environment variables, falling back
    /// to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if a variable is set but cannot be parsed.
    fn from_env() -> Result<Self>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `Config` error naming the offending key.
    fn validate(&self) -> Result<()>;
}

/// Collaborative-filtering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Truncated SVD over the rating matrix
    Factorization,
    /// Brute-force cosine k-nearest-neighbor over user rows
    NearestNeighbor,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Factorization => "factorization",
            ModelType::NearestNeighbor => "nearest_neighbor",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = RecsysError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "factorization" | "svd" => Ok(ModelType::Factorization),
            "nearest_neighbor" | "nearest-neighbor" | "knn" => Ok(ModelType::NearestNeighbor),
            other => Err(RecsysError::config_key(
                format!(
                    "Invalid model type '{}'. Must be one of: factorization (svd), nearest_neighbor (knn)",
                    other
                ),
                "RECSYS_MODEL_TYPE",
            )),
        }
    }
}

/// Recommendation engine configuration
///
/// # Environment Variables
///
/// - `RECSYS_MODEL_TYPE` (optional): `factorization`/`svd` or `nearest_neighbor`/`knn` (default: factorization)
/// - `RECSYS_LATENT_RANK` (optional): latent factors for factorization (default: 10)
/// - `RECSYS_NEIGHBOR_COUNT` (optional): neighbors for nearest-neighbor (default: 5)
/// - `RECSYS_RECOMMENDATION_COUNT` (optional): items per recommendation call (default: 10)
/// - `RECSYS_POSITIVE_RATING_THRESHOLD` (optional): minimum stars for a "liked" review (default: 4)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub model_type: ModelType,
    pub latent_rank: usize,
    pub neighbor_count: usize,
    pub recommendation_count: usize,
    pub positive_rating_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::Factorization,
            latent_rank: 10,
            neighbor_count: 5,
            recommendation_count: 10,
            positive_rating_threshold: 4.0,
        }
    }
}

impl EngineConfig {
    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }
}

impl ConfigLoader for EngineConfig {
    fn from_env() -> Result<Self> {
        let defaults = EngineConfig::default();

        let model_type = parse_env_var("RECSYS_MODEL_TYPE", defaults.model_type)?;
        let latent_rank = parse_env_var("RECSYS_LATENT_RANK", defaults.latent_rank)?;
        let neighbor_count = parse_env_var("RECSYS_NEIGHBOR_COUNT", defaults.neighbor_count)?;
        let recommendation_count =
            parse_env_var("RECSYS_RECOMMENDATION_COUNT", defaults.recommendation_count)?;
        let positive_rating_threshold = parse_env_var(
            "RECSYS_POSITIVE_RATING_THRESHOLD",
            defaults.positive_rating_threshold,
        )?;

        Ok(Self {
            model_type,
            latent_rank,
            neighbor_count,
            recommendation_count,
            positive_rating_threshold,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.latent_rank == 0 {
            return Err(RecsysError::config_key(
                "latent_rank must be greater than 0",
                "RECSYS_LATENT_RANK",
            ));
        }

        if self.neighbor_count == 0 {
            return Err(RecsysError::config_key(
                "neighbor_count must be greater than 0",
                "RECSYS_NEIGHBOR_COUNT",
            ));
        }

        if self.recommendation_count == 0 {
            return Err(RecsysError::config_key(
                "recommendation_count must be greater than 0",
                "RECSYS_RECOMMENDATION_COUNT",
            ));
        }

        if !(1.0..=5.0).contains(&self.positive_rating_threshold) {
            return Err(RecsysError::config_key(
                format!(
                    "positive_rating_threshold ({}) must be between 1 and 5",
                    self.positive_rating_threshold
                ),
                "RECSYS_POSITIVE_RATING_THRESHOLD",
            ));
        }

        Ok(())
    }
}

/// Dataset location and logging configuration
///
/// # Environment Variables
///
/// - `RECSYS_DATA_DIR` (optional): directory holding the JSON-lines snapshots (default: "data")
/// - `RECSYS_USERS_FILE` (optional): default "users.json"
/// - `RECSYS_BUSINESSES_FILE` (optional): default "businesses.json"
/// - `RECSYS_REVIEWS_FILE` (optional): default "reviews.json"
/// - `RECSYS_LOG_LEVEL` (optional): falls back to `RUST_LOG`, then "info"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub users_file: String,
    pub businesses_file: String,
    pub reviews_file: String,
    pub log_level: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            users_file: "users.json".to_string(),
            businesses_file: "businesses.json".to_string(),
            reviews_file: "reviews.json".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl DataConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn businesses_path(&self) -> PathBuf {
        self.data_dir.join(&self.businesses_file)
    }

    pub fn reviews_path(&self) -> PathBuf {
        self.data_dir.join(&self.reviews_file)
    }
}

impl ConfigLoader for DataConfig {
    fn from_env() -> Result<Self> {
        let defaults = DataConfig::default();

        let data_dir = std::env::var("RECSYS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let users_file = std::env::var("RECSYS_USERS_FILE").unwrap_or(defaults.users_file);
        let businesses_file =
            std::env::var("RECSYS_BUSINESSES_FILE").unwrap_or(defaults.businesses_file);
        let reviews_file = std::env::var("RECSYS_REVIEWS_FILE").unwrap_or(defaults.reviews_file);
        let log_level = std::env::var("RECSYS_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        Ok(Self {
            data_dir,
            users_file,
            businesses_file,
            reviews_file,
            log_level,
        })
    }

    fn validate(&self) -> Result<()> {
        for (file, key) in [
            (&self.users_file, "RECSYS_USERS_FILE"),
            (&self.businesses_file, "RECSYS_BUSINESSES_FILE"),
            (&self.reviews_file, "RECSYS_REVIEWS_FILE"),
        ] {
            if file.trim().is_empty() {
                return Err(RecsysError::config_key("file name must not be empty", key));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(RecsysError::config_key(
                format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                "RECSYS_LOG_LEVEL",
            ));
        }

        Ok(())
    }
}

/// Parse an environment variable, returning `default` when it is unset
///
/// # Errors
///
/// Returns a `Config` error if the value is set but cannot be parsed
fn parse_env_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| RecsysError::config_key(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Load a `.env` file if one is present
///
/// A missing file is not an error.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.model_type, ModelType::Factorization);
        assert_eq!(config.latent_rank, 10);
        assert_eq!(config.neighbor_count, 5);
        assert_eq!(config.recommendation_count, 10);
        assert_eq!(config.positive_rating_threshold, 4.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_type_parsing() {
        assert_eq!("svd".parse::<ModelType>().unwrap(), ModelType::Factorization);
        assert_eq!(
            "Factorization".parse::<ModelType>().unwrap(),
            ModelType::Factorization
        );
        assert_eq!("knn".parse::<ModelType>().unwrap(), ModelType::NearestNeighbor);
        assert_eq!(
            "nearest_neighbor".parse::<ModelType>().unwrap(),
            ModelType::NearestNeighbor
        );

        let err = "random_forest".parse::<ModelType>().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_model_type_display_round_trips() {
        for model_type in [ModelType::Factorization, ModelType::NearestNeighbor] {
            assert_eq!(model_type.to_string().parse::<ModelType>().unwrap(), model_type);
        }
    }

    #[test]
    fn test_engine_config_validation() {
        let config = EngineConfig {
            latent_rank: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            neighbor_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            positive_rating_threshold: 6.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_from_env() {
        env::set_var("RECSYS_MODEL_TYPE", "knn");
        env::set_var("RECSYS_NEIGHBOR_COUNT", "7");

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.model_type, ModelType::NearestNeighbor);
        assert_eq!(config.neighbor_count, 7);
        assert_eq!(config.latent_rank, 10);

        env::set_var("RECSYS_NEIGHBOR_COUNT", "seven");
        assert!(EngineConfig::from_env().is_err());

        env::remove_var("RECSYS_MODEL_TYPE");
        env::remove_var("RECSYS_NEIGHBOR_COUNT");
    }

    #[test]
    fn test_data_config_paths() {
        let config = DataConfig::default().with_data_dir("/tmp/yelp");
        assert_eq!(config.users_path(), PathBuf::from("/tmp/yelp/users.json"));
        assert_eq!(
            config.reviews_path(),
            PathBuf::from("/tmp/yelp/reviews.json")
        );
    }

    #[test]
    fn test_data_config_invalid_log_level() {
        let config = DataConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
