//! Error types for Kapittel.

use crate::transcript::FetchError;
use thiserror::Error;

/// Library-level error type for Kapittel operations.
#[derive(Error, Debug)]
pub enum KapittelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript unavailable: {0}")]
    Fetch(#[from] FetchError),

    #[error("All LLM providers failed")]
    AllProvidersFailed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Kapittel operations.
pub type Result<T> = std::result::Result<T, KapittelError>;
