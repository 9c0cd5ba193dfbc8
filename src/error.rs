// Typed errors with thiserror. Expected absence is a value, not an error.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed image reference: {0}")]
    MalformedImageRef(String),

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Invalid record '{slug}': {message}")]
    InvalidRecord { slug: String, message: String },

    #[error("Content transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}
