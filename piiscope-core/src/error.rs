//! Core error types (deterministic only)

use core::fmt;

/// Core errors raised while loading read-only detection data (no I/O in the scan path)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An embedded or supplied lexicon could not be parsed
    InvalidLexicon(String),
    /// A shared word list was installed more than once
    WordListAlreadyLoaded,
    /// A built-in recognizer pattern failed to compile
    InvalidPattern(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidLexicon(msg) => write!(f, "invalid lexicon: {msg}"),
            CoreError::WordListAlreadyLoaded => write!(f, "common-word list already loaded"),
            CoreError::InvalidPattern(msg) => write!(f, "invalid recognizer pattern: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, CoreError>;
