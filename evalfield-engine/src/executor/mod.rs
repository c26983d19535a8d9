//! Execution strategies for row compilation
//!
//! Rows are independent until the track-level compile, so they can be
//! compiled on one thread or fanned out across a pool. Either way every row
//! finishes before [`Executor::compile_rows`] returns.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::rows::Row;
use crate::section::TimeValue;
use evalfield_core::Segment;

#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sequential;

#[cfg(feature = "parallel")]
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

/// Execution mode selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionMode {
    /// Single-threaded row compilation
    Sequential,
    /// Rows compiled across a thread pool
    Parallel,
    /// Parallel once the row count reaches the configured threshold
    #[default]
    Adaptive,
}

/// Strategy for compiling a track's rows
pub trait Executor: Send + Sync {
    /// Compile every row with its own rules, returning segments in row order
    fn compile_rows<T: TimeValue>(&self, rows: &[Row<T>]) -> Result<Vec<Vec<Segment<T>>>>;

    /// Get the execution mode
    fn mode(&self) -> ExecutionMode;
}

/// Resolve the configured mode for `row_count` rows
///
/// Never returns [`ExecutionMode::Adaptive`]. Without the `parallel`
/// feature everything runs sequentially.
pub fn select_mode(row_count: usize, config: &EngineConfig) -> ExecutionMode {
    let wants_parallel = match config.execution_mode {
        ExecutionMode::Sequential => false,
        ExecutionMode::Parallel => true,
        ExecutionMode::Adaptive => row_count > 1 && row_count >= config.parallel_row_threshold,
    };

    if wants_parallel && cfg!(feature = "parallel") {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    }
}
