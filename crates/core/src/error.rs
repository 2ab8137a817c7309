//! Error taxonomy for the recommender
//!
//! Every failure is deterministic (bad input, bad configuration, unknown id),
//! so nothing here is retried; errors surface to the caller as-is.

pub type Result<T> = std::result::Result<T, RecsysError>;

#[derive(Debug, thiserror::Error)]
pub enum RecsysError {
    /// Malformed or empty input records
    #[error("Data error: {0}")]
    Data(String),

    /// Invalid model type, or a parameter incompatible with the matrix shape
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        key: Option<String>,
    },

    /// User or item absent from the fitted matrix or the metadata table
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl RecsysError {
    pub fn data(message: impl Into<String>) -> Self {
        RecsysError::Data(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        RecsysError::Config {
            message: message.into(),
            key: None,
        }
    }

    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        RecsysError::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        RecsysError::NotFound {
            entity: "User",
            id: id.into(),
        }
    }

    pub fn item_not_found(id: impl Into<String>) -> Self {
        RecsysError::NotFound {
            entity: "Item",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RecsysError::NotFound { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, RecsysError::Config { .. })
    }

    pub fn is_data(&self) -> bool {
        matches!(self, RecsysError::Data(_))
    }
}
