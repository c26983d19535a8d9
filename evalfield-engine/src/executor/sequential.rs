//! Sequential execution strategy

use crate::{
    error::Result,
    executor::{ExecutionMode, Executor},
    rows::Row,
    section::TimeValue,
};
use evalfield_core::{Segment, SegmentCompiler};

/// Compiles rows one after another on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn compile_rows<T: TimeValue>(&self, rows: &[Row<T>]) -> Result<Vec<Vec<Segment<T>>>> {
        let mut compiler = SegmentCompiler::new();
        Ok(rows.iter().map(|row| row.compile(&mut compiler)).collect())
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Sequential
    }
}
