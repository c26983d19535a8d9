//! Sweep-line segment compiler
//!
//! Turns a list of possibly overlapping sections into an ordered list of
//! non-overlapping segments, each listing the sections active over it.
//!
//! # Algorithm
//!
//! Lower and upper bounds are collected into two event lists sorted with the
//! bound orderings from [`crate::range`]. The sweep alternates between
//! closing every segment that ends before the next section opens and
//! batch-opening all sections that start at the next lower bound. An active
//! set with reference counts tracks which evaluation references are open, so
//! the same reference may be opened several times (duplicate references,
//! one entity reached through several rows) without being listed twice.
//!
//! The whole sweep is O(n log n) in the number of sections, dominated by the
//! two sorts.

use crate::range::{Bound, Position, Range};
use crate::rules::SegmentRules;
use crate::segment::{EvaluationData, SectionData, Segment};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// A bound paired with the reference it opens or closes
#[derive(Debug, Clone, Copy)]
struct BoundEvent<T> {
    bound: Bound<T>,
    eval: EvaluationData<T>,
}

/// Reusable segment compiler
///
/// Working buffers are kept between calls to amortize allocations and are
/// reset at the start of every [`compile`](Self::compile).
#[derive(Debug)]
pub struct SegmentCompiler<T> {
    lower_bounds: Vec<BoundEvent<T>>,
    upper_bounds: Vec<BoundEvent<T>>,
    /// Open references with their reference counts, in opening order
    overlapping: SmallVec<[(EvaluationData<T>, u32); 8]>,
    lower_read: usize,
    upper_read: usize,
    segments: Vec<Segment<T>>,
}

impl<T> Default for SegmentCompiler<T> {
    fn default() -> Self {
        Self {
            lower_bounds: Vec::new(),
            upper_bounds: Vec::new(),
            overlapping: SmallVec::new(),
            lower_read: 0,
            upper_read: 0,
            segments: Vec::new(),
        }
    }
}

impl<T: Position> SegmentCompiler<T> {
    /// Create a compiler with empty buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `sections` into ordered, non-overlapping segments
    ///
    /// Sections with empty ranges are ignored. When `rules` is given, its
    /// [`process_segments`](SegmentRules::process_segments) runs over the
    /// result with `sections` as source data.
    ///
    /// # Panics
    ///
    /// Panics if the sweep ends with open references or closes a reference
    /// it never opened. Bounds are validated upstream; a reference carrying
    /// an unordered forced time (e.g. NaN) never matches its own closing
    /// bound.
    pub fn compile(
        &mut self,
        sections: &[SectionData<T>],
        rules: Option<&dyn SegmentRules<T>>,
    ) -> Vec<Segment<T>> {
        self.reset(sections.len());

        for section in sections.iter().filter(|section| !section.range.is_empty()) {
            self.lower_bounds.push(BoundEvent {
                bound: section.range.lower,
                eval: section.eval,
            });
            self.upper_bounds.push(BoundEvent {
                bound: section.range.upper,
                eval: section.eval,
            });
        }

        // Stable sorts: input order breaks ties
        self.lower_bounds
            .sort_by(|a, b| Bound::cmp_lower(&a.bound, &b.bound));
        self.upper_bounds
            .sort_by(|a, b| Bound::cmp_upper(&a.bound, &b.bound));

        self.sweep();

        let mut segments = std::mem::take(&mut self.segments);
        if let Some(rules) = rules {
            rules.process_segments(&mut segments, sections);
        }

        log::trace!(
            "compiled {} sections into {} segments",
            sections.len(),
            segments.len()
        );
        segments
    }

    /// Run the sweep over the sorted event lists
    fn sweep(&mut self) {
        while self.lower_read < self.lower_bounds.len() {
            self.close_completed_segments();

            let opening = self.lower_bounds[self.lower_read].bound;
            while let Some(event) = self
                .lower_bounds
                .get(self.lower_read)
                .filter(|event| Bound::cmp_lower(&event.bound, &opening) == Ordering::Equal)
                .copied()
            {
                self.open(event.eval);
                self.lower_read += 1;
            }

            let segment = Segment::new(Range::new(opening, Bound::Open), self.active());
            self.segments.push(segment);
        }

        self.close_completed_segments();

        assert!(
            self.overlapping.is_empty(),
            "segment sweep ended with {} open references",
            self.overlapping.len()
        );
    }

    fn reset(&mut self, capacity: usize) {
        self.lower_bounds.clear();
        self.upper_bounds.clear();
        self.lower_bounds.reserve(capacity);
        self.upper_bounds.reserve(capacity);
        self.overlapping.clear();
        self.segments.clear();
        self.lower_read = 0;
        self.upper_read = 0;
    }

    fn active(&self) -> impl Iterator<Item = EvaluationData<T>> + '_ {
        self.overlapping.iter().map(|(eval, _)| *eval)
    }

    fn open(&mut self, eval: EvaluationData<T>) {
        match self.overlapping.iter_mut().find(|(open, _)| *open == eval) {
            Some((_, count)) => *count += 1,
            None => self.overlapping.push((eval, 1)),
        }
    }

    fn close(&mut self, eval: EvaluationData<T>) {
        let Some(position) = self.overlapping.iter().position(|(open, _)| *open == eval) else {
            panic!("closing bound for {eval:?} has no matching opening bound");
        };
        let count = &mut self.overlapping[position].1;
        *count -= 1;
        if *count == 0 {
            // keep opening order for the remaining references
            self.overlapping.remove(position);
        }
    }

    /// Close every segment that ends before the next lower bound opens
    fn close_completed_segments(&mut self) {
        if self.segments.is_empty() {
            return;
        }

        while let Some(next_upper) = self.upper_bounds.get(self.upper_read).map(|e| e.bound) {
            let next_lower = self.lower_bounds.get(self.lower_read).map(|e| e.bound);

            // The next section opens before the next one closes: end the
            // current segment right before it and stop
            if let Some(next_lower) = next_lower {
                if !Range::new(next_lower, next_upper).is_empty() {
                    if !self.overlapping.is_empty() {
                        self.end_last_segment_before(next_lower);
                    }
                    return;
                }
            }

            let Some(last) = self.segments.last_mut() else {
                return;
            };
            last.range = Range::new(last.range.lower, next_upper);
            debug_assert!(!last.range.is_empty(), "closed an empty segment");

            while let Some(event) = self
                .upper_bounds
                .get(self.upper_read)
                .filter(|event| Bound::cmp_upper(&event.bound, &next_upper) == Ordering::Equal)
                .copied()
            {
                self.close(event.eval);
                self.upper_read += 1;
            }

            if !self.overlapping.is_empty() {
                let segment = Segment::new(
                    Range::new(next_upper.flip_inclusion(), Bound::Open),
                    self.active(),
                );
                self.segments.push(segment);
            }
        }
    }

    /// Cut the last segment just before `opening`, dropping it if nothing
    /// remains; the next batch re-lists its references anyway
    fn end_last_segment_before(&mut self, opening: Bound<T>) {
        let Some(last) = self.segments.last_mut() else {
            return;
        };
        let range = Range::new(last.range.lower, opening.flip_inclusion());
        if range.is_empty() {
            self.segments.pop();
        } else {
            last.range = range;
        }
    }
}

/// Compile `sections` without rules
///
/// ```rust
/// use evalfield_core::{compile_segments, EvaluationData, Range, SectionData};
///
/// let sections = [
///     SectionData::new(Range::closed_open(0.0, 10.0), EvaluationData::new(0), 1),
///     SectionData::new(Range::closed_open(5.0, 15.0), EvaluationData::new(1), 2),
/// ];
/// let segments = compile_segments(&sections);
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[1].range, Range::closed_open(5.0, 10.0));
/// ```
pub fn compile_segments<T: Position>(sections: &[SectionData<T>]) -> Vec<Segment<T>> {
    SegmentCompiler::new().compile(sections, None)
}

/// Compile `sections` and apply `rules` to the result
pub fn compile_segments_with<T: Position>(
    sections: &[SectionData<T>],
    rules: &dyn SegmentRules<T>,
) -> Vec<Segment<T>> {
    SegmentCompiler::new().compile(sections, Some(rules))
}
