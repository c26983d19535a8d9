//! Grouping of timeline sections into rows

use crate::section::{TimeValue, TimelineSection};
use evalfield_core::{
    Bound, EvaluationData, EvaluationFlags, Position, Range, SectionData, Segment,
    SegmentCompiler, SegmentRules,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared rules handle attached to rows
pub type SharedRules<T> = Arc<dyn SegmentRules<T>>;

/// One compiler input within a row, remembering which entity it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRowData<T> {
    /// Index of the entity in the caller's list
    pub source_index: usize,
    /// Range, row-local reference and priority
    pub section: SectionData<T>,
}

/// Sections sharing a row index, compiled together with the row's rules
///
/// Row-local `impl_index` values point at the entry holding the entity's
/// main range; pre- and post-roll entries reuse their parent's index.
#[derive(Clone)]
pub struct Row<T: Position> {
    /// Row index the sections were placed on
    pub index: usize,
    /// Compiler inputs, main ranges and roll ranges interleaved
    pub sections: Vec<SectionRowData<T>>,
    /// Blending and gap rules for this row
    pub rules: Option<SharedRules<T>>,
}

impl<T: Position> fmt::Debug for Row<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("index", &self.index)
            .field("sections", &self.sections)
            .field("rules", &self.rules.as_ref().map(|rules| format!("{rules:?}")))
            .finish()
    }
}

impl<T: Position> Row<T> {
    /// Empty row
    pub fn new(index: usize) -> Self {
        Self {
            index,
            sections: Vec::new(),
            rules: None,
        }
    }

    /// Compile the row into segments with its own rules
    ///
    /// Segment references stay row-local.
    pub fn compile(&self, compiler: &mut SegmentCompiler<T>) -> Vec<Segment<T>> {
        let sections: Vec<SectionData<T>> =
            self.sections.iter().map(|entry| entry.section).collect();
        let segments = compiler.compile(&sections, self.rules.as_deref());
        log::debug!(
            "row {}: {} entries compiled into {} segments",
            self.index,
            sections.len(),
            segments.len()
        );
        segments
    }

    /// Entity index behind a row-local reference
    ///
    /// # Panics
    ///
    /// Panics if `data` does not reference an entry of this row.
    pub fn source_index(&self, data: &EvaluationData<T>) -> usize {
        self.sections[data.impl_index].source_index
    }

    fn push(
        &mut self,
        source_index: usize,
        range: Range<T>,
        eval: EvaluationData<T>,
        priority: i32,
    ) {
        self.sections.push(SectionRowData {
            source_index,
            section: SectionData::new(range, eval, priority),
        });
    }
}

/// Group active sections into rows
///
/// Inactive sections are skipped and infinite sections cover the whole
/// timeline. A closed lower bound with a positive pre-roll adds a
/// `PRE_ROLL` entry ending where the section starts; a closed upper bound
/// with a positive post-roll adds a `POST_ROLL` entry starting where it
/// ends. A roll reaching past the representable time domain leaves its
/// entry unbounded on that side. Rows are returned in row-index order and
/// never empty.
pub fn build_rows<T, S>(sections: &[S], row_rules: Option<SharedRules<T>>) -> Vec<Row<T>>
where
    T: TimeValue,
    S: TimelineSection<T>,
{
    let zero = T::default();
    let mut rows: BTreeMap<usize, Row<T>> = BTreeMap::new();

    for (source_index, section) in sections.iter().enumerate() {
        if !section.is_active() {
            continue;
        }

        let row_index = section.row_index();
        let row = rows
            .entry(row_index)
            .or_insert_with(|| Row::new(row_index));

        let range = if section.is_infinite() {
            Range::all()
        } else {
            section.range()
        };
        let priority = section.priority();
        let local_index = row.sections.len();

        row.push(source_index, range, EvaluationData::new(local_index), priority);

        let pre_roll = section.pre_roll();
        if let Some(start) = range.lower.value().filter(|_| pre_roll > zero) {
            row.push(
                source_index,
                Range::new(
                    start.checked_rewind(pre_roll).map_or(Bound::Open, Bound::Inclusive),
                    range.lower.flip_inclusion(),
                ),
                EvaluationData::with_flags(local_index, EvaluationFlags::PRE_ROLL),
                priority,
            );
        }

        let post_roll = section.post_roll();
        if let Some(end) = range.upper.value().filter(|_| post_roll > zero) {
            row.push(
                source_index,
                Range::new(
                    range.upper.flip_inclusion(),
                    end.checked_advance(post_roll).map_or(Bound::Open, Bound::Inclusive),
                ),
                EvaluationData::with_flags(local_index, EvaluationFlags::POST_ROLL),
                priority,
            );
        }
    }

    rows.into_values()
        .map(|mut row| {
            row.rules = row_rules.clone();
            row
        })
        .collect()
}
