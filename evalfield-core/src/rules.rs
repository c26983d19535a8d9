//! Blending and gap-filling policies applied to compiled segments
//!
//! A [`SegmentRules`] implementation is handed to the compiler and gets a
//! chance to reorder or filter the references of every segment, to fill the
//! empty space around and between segments, and to decide whether segments
//! without references survive. Policies should be pure functions of their
//! inputs so compilation stays deterministic.

use crate::range::{Bound, Position, Range};
use crate::segment::{EvaluationData, SectionData, Segment};
use core::cmp::Reverse;
use core::fmt;

/// Pluggable blending / gap-filling strategy
pub trait SegmentRules<T: Position>: Send + Sync + fmt::Debug {
    /// Reorder, filter or replace the references of a compiled segment
    ///
    /// `source` is the full section list the segment was compiled from;
    /// `impl_index` values index into it.
    fn blend_segment(&self, _segment: &mut Segment<T>, _source: &[SectionData<T>]) {}

    /// Produce a segment for an empty `gap`, or `None` to leave it empty
    ///
    /// The returned range should lie inside `gap`; it is clamped otherwise.
    fn insert_empty_space(
        &self,
        _gap: &Range<T>,
        _previous: Option<&Segment<T>>,
        _next: Option<&Segment<T>>,
    ) -> Option<Segment<T>> {
        None
    }

    /// Keep segments that have no references after blending
    fn allow_empty_segments(&self) -> bool {
        false
    }

    /// Final pass over the list after blending and gap insertion
    fn post_process_segments(&self, _segments: &mut Vec<Segment<T>>, _source: &[SectionData<T>]) {
    }

    /// Apply this policy to a compiled segment list
    ///
    /// Blends every segment, fills the leading, interior and trailing gaps,
    /// runs [`post_process_segments`](Self::post_process_segments) and drops
    /// reference-less segments unless
    /// [`allow_empty_segments`](Self::allow_empty_segments) says otherwise.
    fn process_segments(&self, segments: &mut Vec<Segment<T>>, source: &[SectionData<T>]) {
        if segments.is_empty() {
            return;
        }

        for segment in segments.iter_mut() {
            self.blend_segment(segment, source);
        }

        if segments[0].range.lower.is_closed() {
            insert_gap_segment(self, segments, 0, source);
        }

        let mut index = 1;
        while index < segments.len() {
            if insert_gap_segment(self, segments, index, source) {
                index += 1;
            }
            index += 1;
        }

        let last_is_closed = segments
            .last()
            .is_some_and(|segment| segment.range.upper.is_closed());
        if last_is_closed {
            insert_gap_segment(self, segments, segments.len(), source);
        }

        self.post_process_segments(segments, source);

        if !self.allow_empty_segments() {
            segments.retain(|segment| !segment.impls.is_empty());
        }
    }
}

/// Try to fill the space just before `segments[index]` (or after the last
/// segment when `index == len`); returns true if a segment was inserted
fn insert_gap_segment<T, R>(
    rules: &R,
    segments: &mut Vec<Segment<T>>,
    index: usize,
    source: &[SectionData<T>],
) -> bool
where
    T: Position,
    R: SegmentRules<T> + ?Sized,
{
    let previous = index.checked_sub(1).and_then(|i| segments.get(i));
    let next = segments.get(index);

    let gap = Range::new(
        previous.map_or(Bound::Open, |segment| segment.range.upper.flip_inclusion()),
        next.map_or(Bound::Open, |segment| segment.range.lower.flip_inclusion()),
    );
    if gap.is_empty() {
        return false;
    }

    let Some(mut inserted) = rules.insert_empty_space(&gap, previous, next) else {
        return false;
    };

    if !gap.contains(&inserted.range) {
        log::warn!(
            "gap segment {:?} overflows the empty space {:?}; clamping",
            inserted.range,
            gap
        );
        inserted.range = inserted.range.intersection(&gap);
        if inserted.range.is_empty() {
            return false;
        }
    }

    rules.blend_segment(&mut inserted, source);
    segments.insert(index, inserted);
    true
}

/// Fill `gap` with the references of the nearest neighbour, held at the
/// neighbour's boundary time
///
/// Prefers the previous segment (held at its upper bound); falls back to the
/// next segment (held at its lower bound).
pub fn evaluate_nearest_segment<T: Position>(
    gap: &Range<T>,
    previous: Option<&Segment<T>>,
    next: Option<&Segment<T>>,
) -> Option<Segment<T>> {
    let (neighbour, hold) = match (previous, next) {
        (Some(previous), _) => (previous, previous.range.upper.value()),
        (None, Some(next)) => (next, next.range.lower.value()),
        (None, None) => return None,
    };

    Some(Segment::new(
        *gap,
        neighbour.impls.iter().map(|data| EvaluationData {
            forced_time: hold,
            ..*data
        }),
    ))
}

/// Rules that keep the compiler's output untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultRules;

impl<T: Position> SegmentRules<T> for DefaultRules {}

/// How the references of an overlapping segment are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlendMode {
    /// Keep every reference in opening order
    #[default]
    All,
    /// Keep every reference, highest priority first
    Additive,
    /// Keep only the highest-priority reference (earliest wins ties)
    HighestPriority,
}

/// What happens to empty space around and between segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GapPolicy {
    /// Leave gaps empty
    #[default]
    Leave,
    /// Hold the nearest segment's references at its boundary time
    Nearest,
    /// Insert a segment with no references
    Marker,
}

/// Table-driven rules policy
///
/// ```rust
/// use evalfield_core::{compile_segments_with, EvaluationData, Range, RulePolicy, SectionData};
///
/// let sections = [
///     SectionData::new(Range::closed_open(0.0, 10.0), EvaluationData::new(0), 1),
///     SectionData::new(Range::closed_open(5.0, 15.0), EvaluationData::new(1), 2),
/// ];
/// let segments = compile_segments_with(&sections, &RulePolicy::highest_priority());
/// let winners: Vec<usize> = segments.iter().flat_map(|s| s.impl_indices()).collect();
/// assert_eq!(winners, vec![0, 1, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulePolicy {
    /// Blending of overlapping references
    pub blend: BlendMode,
    /// Gap filling
    pub gaps: GapPolicy,
    /// Keep segments without references
    pub allow_empty_segments: bool,
}

impl RulePolicy {
    /// Keep every reference, sorted by descending priority
    pub fn additive() -> Self {
        Self {
            blend: BlendMode::Additive,
            ..Default::default()
        }
    }

    /// Only the highest-priority reference survives an overlap
    pub fn highest_priority() -> Self {
        Self {
            blend: BlendMode::HighestPriority,
            ..Default::default()
        }
    }

    /// Highest priority wins and gaps hold the nearest section
    pub fn evaluate_nearest() -> Self {
        Self {
            blend: BlendMode::HighestPriority,
            gaps: GapPolicy::Nearest,
            ..Default::default()
        }
    }
}

fn priority_of<T>(source: &[SectionData<T>], data: &EvaluationData<T>) -> i32 {
    source
        .get(data.impl_index)
        .map_or(i32::MIN, |section| section.priority)
}

impl<T: Position> SegmentRules<T> for RulePolicy {
    fn blend_segment(&self, segment: &mut Segment<T>, source: &[SectionData<T>]) {
        match self.blend {
            BlendMode::All => {}
            BlendMode::Additive => {
                segment
                    .impls
                    .sort_by_key(|data| Reverse(priority_of(source, data)));
            }
            BlendMode::HighestPriority => {
                let mut winner: Option<(i32, EvaluationData<T>)> = None;
                for data in &segment.impls {
                    let priority = priority_of(source, data);
                    if winner.map_or(true, |(best, _)| priority > best) {
                        winner = Some((priority, *data));
                    }
                }
                if let Some((_, data)) = winner {
                    segment.impls.clear();
                    segment.impls.push(data);
                }
            }
        }
    }

    fn insert_empty_space(
        &self,
        gap: &Range<T>,
        previous: Option<&Segment<T>>,
        next: Option<&Segment<T>>,
    ) -> Option<Segment<T>> {
        match self.gaps {
            GapPolicy::Leave => None,
            GapPolicy::Nearest => evaluate_nearest_segment(gap, previous, next),
            GapPolicy::Marker => Some(Segment::empty(*gap)),
        }
    }

    fn allow_empty_segments(&self) -> bool {
        self.allow_empty_segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::EvaluationFlags;

    fn section(start: f64, end: f64, index: usize, priority: i32) -> SectionData<f64> {
        SectionData::new(
            Range::closed_open(start, end),
            EvaluationData::new(index),
            priority,
        )
    }

    fn segment(start: f64, end: f64, indices: &[usize]) -> Segment<f64> {
        Segment::new(
            Range::closed_open(start, end),
            indices.iter().map(|&i| EvaluationData::new(i)),
        )
    }

    /// Policy that returns a fixed range for every gap
    #[derive(Debug)]
    struct FixedGap(Range<f64>);

    impl SegmentRules<f64> for FixedGap {
        fn insert_empty_space(
            &self,
            _gap: &Range<f64>,
            _previous: Option<&Segment<f64>>,
            _next: Option<&Segment<f64>>,
        ) -> Option<Segment<f64>> {
            Some(Segment::new(self.0, [EvaluationData::new(0)]))
        }
    }

    #[test]
    fn test_default_rules_leave_segments_untouched() {
        let source = [section(0.0, 5.0, 0, 0)];
        let mut segments = vec![segment(0.0, 5.0, &[0])];
        DefaultRules.process_segments(&mut segments, &source);
        assert_eq!(segments, vec![segment(0.0, 5.0, &[0])]);
    }

    #[test]
    fn test_additive_sorts_by_priority() {
        let source = [
            section(0.0, 5.0, 0, 1),
            section(0.0, 5.0, 1, 3),
            section(0.0, 5.0, 2, 2),
        ];
        let mut seg = segment(0.0, 5.0, &[0, 1, 2]);
        RulePolicy::additive().blend_segment(&mut seg, &source);
        assert_eq!(seg.impl_indices().collect::<Vec<_>>(), vec![1, 2, 0]);
    }

    #[test]
    fn test_highest_priority_keeps_earliest_on_tie() {
        let source = [section(0.0, 5.0, 0, 2), section(0.0, 5.0, 1, 2)];
        let mut seg = segment(0.0, 5.0, &[1, 0]);
        RulePolicy::highest_priority().blend_segment(&mut seg, &source);
        assert_eq!(seg.impl_indices().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_nearest_fills_leading_interior_and_trailing_gaps() {
        let source = [section(0.0, 5.0, 0, 0), section(8.0, 10.0, 1, 0)];
        let mut segments = vec![segment(0.0, 5.0, &[0]), segment(8.0, 10.0, &[1])];

        RulePolicy::evaluate_nearest().process_segments(&mut segments, &source);

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].range, Range::less_than(0.0));
        assert_eq!(
            segments[0].impls[0],
            EvaluationData::with_forced_time(0, 0.0)
        );
        assert_eq!(segments[2].range, Range::closed_open(5.0, 8.0));
        assert_eq!(
            segments[2].impls[0],
            EvaluationData::with_forced_time(0, 5.0)
        );
        assert_eq!(segments[4].range, Range::at_least(10.0));
        assert_eq!(
            segments[4].impls[0],
            EvaluationData::with_forced_time(1, 10.0)
        );
    }

    #[test]
    fn test_nearest_keeps_flags() {
        let previous = Segment::new(
            Range::closed_open(0.0, 1.0),
            [EvaluationData::with_flags(2, EvaluationFlags::POST_ROLL)],
        );
        let gap = Range::at_least(1.0);
        let filled = evaluate_nearest_segment(&gap, Some(&previous), None).unwrap();
        assert_eq!(filled.range, gap);
        assert_eq!(filled.impls[0].flags, EvaluationFlags::POST_ROLL);
        assert_eq!(filled.impls[0].forced_time, Some(1.0));
        assert!(evaluate_nearest_segment::<f64>(&gap, None, None).is_none());
    }

    #[test]
    fn test_markers_dropped_unless_allowed() {
        let source = [section(0.0, 5.0, 0, 0)];

        let mut dropped = vec![segment(0.0, 5.0, &[0])];
        RulePolicy {
            gaps: GapPolicy::Marker,
            ..Default::default()
        }
        .process_segments(&mut dropped, &source);
        assert_eq!(dropped.len(), 1);

        let mut kept = vec![segment(0.0, 5.0, &[0])];
        RulePolicy {
            gaps: GapPolicy::Marker,
            allow_empty_segments: true,
            ..Default::default()
        }
        .process_segments(&mut kept, &source);
        assert_eq!(kept.len(), 3);
        assert!(kept[0].impls.is_empty());
        assert_eq!(kept[0].range, Range::less_than(0.0));
        assert!(kept[2].impls.is_empty());
        assert_eq!(kept[2].range, Range::at_least(5.0));
    }

    #[test]
    fn test_contiguous_segments_get_no_interior_gap() {
        let source = [section(0.0, 5.0, 0, 0), section(5.0, 9.0, 1, 0)];
        let mut segments = vec![segment(0.0, 5.0, &[0]), segment(5.0, 9.0, &[1])];
        RulePolicy {
            gaps: GapPolicy::Marker,
            allow_empty_segments: true,
            ..Default::default()
        }
        .process_segments(&mut segments, &source);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1], segment(0.0, 5.0, &[0]));
        assert_eq!(segments[2], segment(5.0, 9.0, &[1]));
    }

    #[test]
    fn test_overflowing_gap_segment_is_clamped() {
        let source = [section(0.0, 5.0, 0, 0)];
        let mut segments = vec![segment(0.0, 5.0, &[0])];
        FixedGap(Range::closed_open(-2.0, 7.0)).process_segments(&mut segments, &source);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].range, Range::closed_open(-2.0, 0.0));
        assert_eq!(segments[2].range, Range::closed_open(5.0, 7.0));
    }

    #[test]
    fn test_gap_segment_outside_gap_is_discarded() {
        let source = [section(0.0, 5.0, 0, 0)];
        let mut segments = vec![segment(0.0, 5.0, &[0])];
        FixedGap(Range::closed_open(1.0, 2.0)).process_segments(&mut segments, &source);
        assert_eq!(segments, vec![segment(0.0, 5.0, &[0])]);
    }

    #[test]
    fn test_empty_list_is_left_alone() {
        let mut segments: Vec<Segment<f64>> = Vec::new();
        RulePolicy {
            gaps: GapPolicy::Marker,
            allow_empty_segments: true,
            ..Default::default()
        }
        .process_segments(&mut segments, &[]);
        assert!(segments.is_empty());
    }
}
