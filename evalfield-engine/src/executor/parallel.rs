//! Parallel execution strategy

use crate::{
    error::{EngineError, Result},
    executor::{ExecutionMode, Executor},
    rows::Row,
    section::TimeValue,
};
use evalfield_core::{Segment, SegmentCompiler};
use rayon::prelude::*;
use std::sync::Arc;

/// Compiles rows across a rayon thread pool
///
/// Without an explicit thread count the global pool is used. A dedicated
/// pool is built once and shared by clones of the executor.
#[derive(Debug, Clone, Default)]
pub struct ParallelExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelExecutor {
    /// Create an executor; `Some(n)` builds a dedicated pool of `n` workers
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = match threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| EngineError::ThreadPool(e.to_string()))?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self { pool })
    }

    /// Number of worker threads rows are spread over
    pub fn thread_count(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }
}

impl Executor for ParallelExecutor {
    fn compile_rows<T: TimeValue>(&self, rows: &[Row<T>]) -> Result<Vec<Vec<Segment<T>>>> {
        log::debug!(
            "compiling {} rows on {} threads",
            rows.len(),
            self.thread_count()
        );

        // Collecting an indexed parallel iterator keeps row order
        let compile = || -> Vec<Vec<Segment<T>>> {
            rows.par_iter()
                .map_init(SegmentCompiler::new, |compiler, row| row.compile(compiler))
                .collect()
        };

        Ok(match &self.pool {
            Some(pool) => pool.install(compile),
            None => compile(),
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Parallel
    }
}
