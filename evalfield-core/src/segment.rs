//! Compiler input and output types
//!
//! This module consolidates the data flowing through the segment compiler:
//! opaque evaluation references, the sections fed in, and the segments
//! produced.

use crate::range::Range;
use smallvec::SmallVec;

// ============================================================================
// Evaluation References
// ============================================================================

/// Flags attached to an evaluation reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationFlags {
    /// Reference comes from a pre-roll window before the section starts
    pub pre_roll: bool,
    /// Reference comes from a post-roll window after the section ends
    pub post_roll: bool,
}

impl EvaluationFlags {
    /// No flags
    pub const NONE: Self = Self {
        pre_roll: false,
        post_roll: false,
    };
    /// Pre-roll only
    pub const PRE_ROLL: Self = Self {
        pre_roll: true,
        post_roll: false,
    };
    /// Post-roll only
    pub const POST_ROLL: Self = Self {
        pre_roll: false,
        post_roll: true,
    };

    /// Check if all flags set in `other` are also set in `self`
    pub fn contains(&self, other: Self) -> bool {
        if other.pre_roll && !self.pre_roll {
            return false;
        }
        if other.post_roll && !self.post_roll {
            return false;
        }
        true
    }

    /// True when no flag is set
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Opaque reference to a source interval
///
/// `impl_index` indexes whichever source array is current at the level that
/// produced it: the row-local section list, the flattened track list, or
/// finally the caller's original entity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationData<T> {
    /// Index of the source interval
    pub impl_index: usize,
    /// Roll flags
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: EvaluationFlags,
    /// Time to evaluate at instead of the query time (set by gap filling)
    pub forced_time: Option<T>,
}

impl<T> EvaluationData<T> {
    /// Reference to `impl_index` with no flags
    pub const fn new(impl_index: usize) -> Self {
        Self {
            impl_index,
            flags: EvaluationFlags::NONE,
            forced_time: None,
        }
    }

    /// Reference to `impl_index` with the given flags
    pub const fn with_flags(impl_index: usize, flags: EvaluationFlags) -> Self {
        Self {
            impl_index,
            flags,
            forced_time: None,
        }
    }

    /// Reference to `impl_index` evaluated at a fixed time
    pub const fn with_forced_time(impl_index: usize, forced_time: T) -> Self {
        Self {
            impl_index,
            flags: EvaluationFlags::NONE,
            forced_time: Some(forced_time),
        }
    }
}

/// Ordered list of evaluation references held by a segment
///
/// Overlap counts are a handful in practice, so the list stays inline.
pub type ImplList<T> = SmallVec<[EvaluationData<T>; 4]>;

// ============================================================================
// Compiler Input
// ============================================================================

/// One interval fed to the segment compiler
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionData<T> {
    /// Range the interval is active over
    pub range: Range<T>,
    /// Reference reported for every segment inside `range`
    pub eval: EvaluationData<T>,
    /// Blending priority, higher wins
    pub priority: i32,
}

impl<T> SectionData<T> {
    /// Create a section
    pub const fn new(range: Range<T>, eval: EvaluationData<T>, priority: i32) -> Self {
        Self {
            range,
            eval,
            priority,
        }
    }
}

// ============================================================================
// Compiler Output
// ============================================================================

/// A sub-range of the timeline with a fixed set of active references
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment<T> {
    /// Range covered
    pub range: Range<T>,
    /// References active over the whole range
    pub impls: ImplList<T>,
}

impl<T: Copy> Segment<T> {
    /// Segment with no references (a gap marker)
    pub fn empty(range: Range<T>) -> Self {
        Self {
            range,
            impls: SmallVec::new(),
        }
    }

    /// Segment holding `impls`
    pub fn new<I>(range: Range<T>, impls: I) -> Self
    where
        I: IntoIterator<Item = EvaluationData<T>>,
    {
        Self {
            range,
            impls: impls.into_iter().collect(),
        }
    }

    /// Iterate the referenced indices in order
    pub fn impl_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.impls.iter().map(|data| data.impl_index)
    }
}

impl<T: PartialEq> Segment<T> {
    /// True if both segments reference the same set of evaluation data,
    /// ignoring order
    pub fn same_impls(&self, other: &Self) -> bool {
        self.impls.len() == other.impls.len()
            && self.impls.iter().all(|data| other.impls.contains(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_contains() {
        let both = EvaluationFlags {
            pre_roll: true,
            post_roll: true,
        };
        assert!(both.contains(EvaluationFlags::PRE_ROLL));
        assert!(both.contains(EvaluationFlags::POST_ROLL));
        assert!(!EvaluationFlags::PRE_ROLL.contains(EvaluationFlags::POST_ROLL));
        assert!(EvaluationFlags::NONE.is_empty());
        assert!(EvaluationFlags::default().is_empty());
    }

    #[test]
    fn test_evaluation_data_identity_includes_flags() {
        let main = EvaluationData::<f64>::new(3);
        let pre = EvaluationData::with_flags(3, EvaluationFlags::PRE_ROLL);
        assert_ne!(main, pre);
        assert_eq!(main, EvaluationData::new(3));
        assert_ne!(main, EvaluationData::with_forced_time(3, 1.0));
    }

    #[test]
    fn test_same_impls_ignores_order() {
        let range = Range::closed_open(0.0, 1.0);
        let a = Segment::new(range, [EvaluationData::new(1), EvaluationData::new(2)]);
        let b = Segment::new(range, [EvaluationData::new(2), EvaluationData::new(1)]);
        let c = Segment::new(range, [EvaluationData::new(2)]);
        assert!(a.same_impls(&b));
        assert!(!a.same_impls(&c));
        assert!(Segment::<f64>::empty(range).same_impls(&Segment::empty(range)));
    }

    #[test]
    fn test_impl_indices() {
        let segment = Segment::new(
            Range::all(),
            [EvaluationData::<f64>::new(4), EvaluationData::new(0)],
        );
        assert_eq!(segment.impl_indices().collect::<Vec<_>>(), vec![4, 0]);
    }
}
