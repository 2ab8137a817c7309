//! # Yelp RecSys Core
//!
//! Shared building blocks for the review-platform recommender.
//!
//! ## Modules
//!
//! - `models`: User, Business and Review records
//! - `error`: Error taxonomy and result alias
//! - `config`: Configuration loading and validation
//! - `store`: In-memory interaction store and JSON-lines loader
//! - `stats`: Descriptive statistics (histogram bin counts)
//! - `observability`: Structured logging setup

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::{load_dotenv, ConfigLoader, DataConfig, EngineConfig, ModelType};
pub use error::{RecsysError, Result};
pub use models::{Business, Review, User};
pub use observability::{init_logging, LogConfig, LogFormat, ObservabilityError};
pub use stats::{histogram, DatasetStats, Histogram, UserStats};
pub use store::{read_json_lines, InteractionStore};
