//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Detection failed inside the core library
    DetectionError(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::DetectionError(msg) => write!(f, "Detection error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<piiscope_core::ApiError> for CliError {
    fn from(err: piiscope_core::ApiError) -> Self {
        match err {
            piiscope_core::ApiError::Configuration(msg) => CliError::ConfigError(msg),
            piiscope_core::ApiError::ConfigParse(e) => CliError::ConfigError(e.to_string()),
            other => CliError::DetectionError(other.to_string()),
        }
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
