//! Engine error types
//!
//! The segment algorithm has no recoverable failures; errors here come from
//! external input that fails validation and from execution setup.

use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A section failed validation before compilation
    #[error("invalid section at index {index}: {reason}")]
    InvalidSection {
        /// Position of the section in the caller's list
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration error
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// Worker thread pool could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl EngineError {
    pub(crate) fn invalid_section(index: usize, reason: impl Into<String>) -> Self {
        EngineError::InvalidSection {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
