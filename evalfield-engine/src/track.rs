//! Two-level track compilation
//!
//! Each row is compiled on its own so row rules only ever see overlaps
//! inside that row. The row results are then flattened into one list where
//! earlier rows get higher priority, compiled again at track level, and
//! finally remapped to entity indices and merged.

use crate::config::EngineConfig;
use crate::error::Result;
#[cfg(feature = "parallel")]
use crate::executor::ParallelExecutor;
use crate::executor::{self, ExecutionMode, Executor, SequentialExecutor};
use crate::field::EvaluationField;
use crate::rows::{build_rows, Row, SharedRules};
use crate::section::{validate_sections, TimeValue, TimelineSection};
use evalfield_core::{EvaluationData, SectionData, Segment, SegmentCompiler, SegmentRules};

/// Compiles rows of sections into an [`EvaluationField`]
#[derive(Debug, Clone, Default)]
pub struct TrackCompiler {
    config: EngineConfig,
    #[cfg(feature = "parallel")]
    parallel: ParallelExecutor,
}

impl TrackCompiler {
    /// Create a compiler with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler with custom configuration
    ///
    /// A configured thread count builds the worker pool here, once.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let parallel = match config.execution_mode {
            ExecutionMode::Sequential => ParallelExecutor::default(),
            _ => ParallelExecutor::new(config.threads)?,
        };

        Ok(Self {
            config,
            #[cfg(feature = "parallel")]
            parallel,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execution mode that would be used for `row_count` rows
    pub fn execution_mode(&self, row_count: usize) -> ExecutionMode {
        executor::select_mode(row_count, &self.config)
    }

    /// Compile rows into a single evaluation field
    ///
    /// Rows are compiled with their own rules, flattened in row order with
    /// priority `row_count - position`, compiled again without rules and
    /// then passed through `track_rules`. Adjoining segments that end up
    /// with the same references are merged.
    ///
    /// # Errors
    ///
    /// Propagates executor failures; the bundled executors do not fail.
    pub fn compile<T: TimeValue>(
        &self,
        rows: &[Row<T>],
        track_rules: Option<&dyn SegmentRules<T>>,
    ) -> Result<EvaluationField<T>> {
        let row_segments = match self.execution_mode(rows.len()) {
            #[cfg(feature = "parallel")]
            ExecutionMode::Parallel => self.parallel.compile_rows(rows)?,
            _ => SequentialExecutor.compile_rows(rows)?,
        };

        let (source, source_lut) = flatten_rows(rows, row_segments);

        let mut compiler = SegmentCompiler::new();
        let mut segments = compiler.compile(&source, None);
        if let Some(rules) = track_rules {
            rules.process_segments(&mut segments, &source);
        }

        let allow_empty = track_rules.is_some_and(|rules| rules.allow_empty_segments());
        let merged = merge_segments(segments, &source_lut, allow_empty);

        log::debug!(
            "track: {} rows, {} flattened entries, {} segments",
            rows.len(),
            source.len(),
            merged.len()
        );

        Ok(EvaluationField::new(merged))
    }

    /// Validate entities, group them into rows and compile the track
    pub fn compile_sections<T, S>(
        &self,
        sections: &[S],
        row_rules: Option<SharedRules<T>>,
        track_rules: Option<&dyn SegmentRules<T>>,
    ) -> Result<EvaluationField<T>>
    where
        T: TimeValue,
        S: TimelineSection<T>,
    {
        validate_sections(sections)?;
        let rows = build_rows(sections, row_rules);
        self.compile(&rows, track_rules)
    }
}

/// Compile rows with the default configuration
pub fn compile_track<T: TimeValue>(
    rows: &[Row<T>],
    track_rules: Option<&dyn SegmentRules<T>>,
) -> Result<EvaluationField<T>> {
    TrackCompiler::new().compile(rows, track_rules)
}

/// Turn per-row segments into track-level compiler input
///
/// Returns the flattened sections and, for each of them, the entity index
/// its reference resolves to.
fn flatten_rows<T: TimeValue>(
    rows: &[Row<T>],
    row_segments: Vec<Vec<Segment<T>>>,
) -> (Vec<SectionData<T>>, Vec<usize>) {
    let row_count = rows.len();
    let mut source = Vec::new();
    let mut source_lut = Vec::new();

    for (position, (row, segments)) in rows.iter().zip(row_segments).enumerate() {
        let priority = i32::try_from(row_count - position).unwrap_or(i32::MAX);
        for segment in segments {
            for data in segment.impls {
                source_lut.push(row.source_index(&data));
                let eval = EvaluationData {
                    impl_index: source.len(),
                    ..data
                };
                source.push(SectionData::new(segment.range, eval, priority));
            }
        }
    }

    (source, source_lut)
}

/// Remap references to entity indices and merge identical neighbours
fn merge_segments<T: TimeValue>(
    segments: Vec<Segment<T>>,
    source_lut: &[usize],
    allow_empty: bool,
) -> Vec<Segment<T>> {
    let mut merged: Vec<Segment<T>> = Vec::with_capacity(segments.len());

    for mut segment in segments {
        for data in segment.impls.iter_mut() {
            data.impl_index = source_lut[data.impl_index];
        }

        if segment.impls.is_empty() && !allow_empty {
            continue;
        }

        match merged.last_mut() {
            Some(last) if last.range.adjoins(&segment.range) && last.same_impls(&segment) => {
                last.range = last.range.hull(&segment.range);
            }
            _ => merged.push(segment),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionDef;
    use evalfield_core::{GapPolicy, Range, RulePolicy};
    use std::sync::Arc;

    fn indices(segment: &Segment<f64>) -> Vec<usize> {
        segment.impl_indices().collect()
    }

    #[test]
    fn test_empty_track() {
        let field = compile_track::<f64>(&[], None).unwrap();
        assert!(field.is_empty());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_configured_pool_reused_across_compiles() {
        let config = EngineConfig {
            threads: Some(2),
            ..EngineConfig::parallel()
        };
        let compiler = TrackCompiler::with_config(config).unwrap();
        assert_eq!(compiler.parallel.thread_count(), 2);

        let sections: Vec<SectionDef<f64>> = (0..6)
            .map(|i| {
                SectionDef::new(Range::closed_open(f64::from(i), 8.0)).with_row(i as usize)
            })
            .collect();
        let first = compiler.compile_sections(&sections, None, None).unwrap();
        let second = compiler.clone().compile_sections(&sections, None, None).unwrap();
        assert_eq!(first, second);

        let sequential = TrackCompiler::with_config(EngineConfig::sequential()).unwrap();
        assert_eq!(
            sequential.compile_sections(&sections, None, None).unwrap(),
            first
        );
    }

    #[test]
    fn test_rows_split_by_row_rules_merge_back() {
        let sections = [SectionDef::new(Range::closed_open(0.0, 10.0))];
        let field = TrackCompiler::new()
            .compile_sections(&sections, None, None)
            .unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.segments()[0].range, Range::closed_open(0.0, 10.0));
    }

    #[test]
    fn test_earlier_rows_win_under_highest_priority() {
        let sections = [
            SectionDef::new(Range::closed_open(0.0, 10.0)).with_row(1),
            SectionDef::new(Range::closed_open(5.0, 15.0)).with_row(0),
        ];
        let track_rules = RulePolicy::highest_priority();
        let field = TrackCompiler::new()
            .compile_sections(&sections, None, Some(&track_rules))
            .unwrap();

        let segments = field.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].range, Range::closed_open(0.0, 5.0));
        assert_eq!(indices(&segments[0]), vec![0]);
        assert_eq!(segments[1].range, Range::closed_open(5.0, 15.0));
        assert_eq!(indices(&segments[1]), vec![1]);
    }

    #[test]
    fn test_track_gap_markers_survive_when_allowed() {
        let sections = [
            SectionDef::new(Range::closed_open(0.0, 2.0)),
            SectionDef::new(Range::closed_open(4.0, 6.0)),
        ];
        let track_rules = RulePolicy {
            gaps: GapPolicy::Marker,
            allow_empty_segments: true,
            ..RulePolicy::default()
        };
        let field = TrackCompiler::new()
            .compile_sections(&sections, None, Some(&track_rules))
            .unwrap();

        assert_eq!(field.len(), 5);
        assert_eq!(field.segments()[2].range, Range::closed_open(2.0, 4.0));
        assert!(field.segments()[2].impls.is_empty());
    }

    #[test]
    fn test_nearest_gap_fill_at_track_level() {
        let sections = [
            SectionDef::new(Range::closed_open(0.0, 2.0)),
            SectionDef::new(Range::closed_open(4.0, 6.0)).with_row(1),
        ];
        let row_rules: SharedRules<f64> = Arc::new(RulePolicy::default());
        let track_rules = RulePolicy::evaluate_nearest();
        let field = TrackCompiler::new()
            .compile_sections(&sections, Some(row_rules), Some(&track_rules))
            .unwrap();

        let held = field.impls_at(3.0);
        assert_eq!(held, &[EvaluationData::with_forced_time(0, 2.0)]);
        let before = field.impls_at(-1.0);
        assert_eq!(before, &[EvaluationData::with_forced_time(0, 0.0)]);
        let after = field.impls_at(100.0);
        assert_eq!(after, &[EvaluationData::with_forced_time(1, 6.0)]);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let sections = [SectionDef::new(Range::closed_open(0.0, f64::NAN))];
        let result = TrackCompiler::new().compile_sections(&sections, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let sections: Vec<SectionDef<f64>> = (0..30)
            .map(|i| {
                let start = f64::from(i * 3 % 11);
                SectionDef::new(Range::closed_open(start, start + 4.0))
                    .with_row(i as usize % 6)
                    .with_priority(i % 3)
            })
            .collect();
        let row_rules: SharedRules<f64> = Arc::new(RulePolicy::highest_priority());
        let rows = build_rows(&sections, Some(row_rules));

        let sequential = TrackCompiler::with_config(EngineConfig::sequential())
            .unwrap()
            .compile(&rows, None)
            .unwrap();
        let parallel = TrackCompiler::with_config(EngineConfig::parallel())
            .unwrap()
            .compile(&rows, None)
            .unwrap();
        assert_eq!(sequential, parallel);
    }
}
