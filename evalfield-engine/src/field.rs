//! Compiled evaluation field

use evalfield_core::{Bound, EvaluationData, Position, Range, Segment};

/// Ordered, non-overlapping segments of a compiled track
///
/// `impl_index` values in the segments index the entity list the track was
/// built from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationField<T> {
    segments: Vec<Segment<T>>,
}

impl<T> Default for EvaluationField<T> {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
        }
    }
}

impl<T: Position> EvaluationField<T> {
    /// Wrap segments that are already ordered and non-overlapping
    pub fn new(segments: Vec<Segment<T>>) -> Self {
        Self { segments }
    }

    /// All segments in timeline order
    pub fn segments(&self) -> &[Segment<T>] {
        &self.segments
    }

    /// Take the segments out of the field
    pub fn into_segments(self) -> Vec<Segment<T>> {
        self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if nothing evaluates anywhere
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the segment containing `time`
    pub fn find_segment(&self, time: T) -> Option<usize> {
        // Lower bounds strictly increase, so "starts at or before time" is a
        // prefix of the list
        let end = self.segments.partition_point(|segment| {
            Range::new(segment.range.lower, Bound::Open).contains_value(time)
        });
        let index = end.checked_sub(1)?;
        self.segments[index]
            .range
            .contains_value(time)
            .then_some(index)
    }

    /// Segment containing `time`
    pub fn segment_at(&self, time: T) -> Option<&Segment<T>> {
        self.find_segment(time).map(|index| &self.segments[index])
    }

    /// References evaluated at `time`, empty where nothing evaluates
    pub fn impls_at(&self, time: T) -> &[EvaluationData<T>] {
        self.segment_at(time)
            .map(|segment| segment.impls.as_slice())
            .unwrap_or_default()
    }
}
