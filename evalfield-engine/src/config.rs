//! Configuration types for the engine

use crate::error::{EngineError, Result};
use crate::executor::ExecutionMode;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Execution mode selector
    pub execution_mode: ExecutionMode,
    /// Number of threads for parallel row compilation (None = auto)
    pub threads: Option<usize>,
    /// Minimum row count before adaptive mode goes parallel
    pub parallel_row_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::Adaptive,
            threads: None,
            parallel_row_threshold: 16,
        }
    }
}

impl EngineConfig {
    /// Always compile rows on the calling thread
    pub fn sequential() -> Self {
        Self {
            execution_mode: ExecutionMode::Sequential,
            threads: Some(1),
            parallel_row_threshold: usize::MAX,
        }
    }

    /// Always compile rows in parallel, using every available core
    pub fn parallel() -> Self {
        Self {
            execution_mode: ExecutionMode::Parallel,
            threads: None,
            parallel_row_threshold: 0,
        }
    }

    /// Check the configuration for values the executors cannot use
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(EngineError::ConfigError(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
