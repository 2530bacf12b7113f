//! Error types for the API

use crate::error::CoreError;
use thiserror::Error;

/// Error type for API operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration text is not valid TOML for [`Config`](crate::api::Config)
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Lexicon or word-list failure from the core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Infrastructure error (I/O, etc.)
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;
