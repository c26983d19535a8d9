//! Timeline entities fed to the track compiler

use crate::error::{EngineError, Result};
use evalfield_core::{Bound, Position, Range};
use std::cmp::Ordering;

/// Time type usable by the engine
///
/// Beyond the ordering the core needs, the engine offsets bounds by pre- and
/// post-roll durations; `Default` is the zero duration. The offsets return
/// `None` when the result leaves the representable domain, and the roll
/// entry is then left unbounded on that side.
pub trait TimeValue: Position + Default + Send + Sync {
    /// `self - duration`, if representable
    fn checked_rewind(self, duration: Self) -> Option<Self>;

    /// `self + duration`, if representable
    fn checked_advance(self, duration: Self) -> Option<Self>;
}

macro_rules! integer_time_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TimeValue for $ty {
                fn checked_rewind(self, duration: Self) -> Option<Self> {
                    self.checked_sub(duration)
                }

                fn checked_advance(self, duration: Self) -> Option<Self> {
                    self.checked_add(duration)
                }
            }
        )*
    };
}

macro_rules! float_time_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TimeValue for $ty {
                fn checked_rewind(self, duration: Self) -> Option<Self> {
                    Some(self - duration).filter(|value| value.is_finite())
                }

                fn checked_advance(self, duration: Self) -> Option<Self> {
                    Some(self + duration).filter(|value| value.is_finite())
                }
            }
        )*
    };
}

integer_time_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float_time_value!(f32, f64);

/// Entity placed on a timeline row
pub trait TimelineSection<T: TimeValue> {
    /// Inactive sections are skipped entirely
    fn is_active(&self) -> bool;

    /// Row the section lives on
    fn row_index(&self) -> usize;

    /// Range the section is active over
    fn range(&self) -> Range<T>;

    /// Infinite sections cover the whole timeline regardless of `range`
    fn is_infinite(&self) -> bool {
        false
    }

    /// Overlap priority within the row, higher wins
    fn priority(&self) -> i32;

    /// Duration evaluated before a closed lower bound
    fn pre_roll(&self) -> T {
        T::default()
    }

    /// Duration evaluated after a closed upper bound
    fn post_roll(&self) -> T {
        T::default()
    }
}

/// A missing entity is never active
impl<T: TimeValue, S: TimelineSection<T>> TimelineSection<T> for Option<S> {
    fn is_active(&self) -> bool {
        self.as_ref().is_some_and(|section| section.is_active())
    }

    fn row_index(&self) -> usize {
        self.as_ref().map_or(0, |section| section.row_index())
    }

    fn range(&self) -> Range<T> {
        self.as_ref().map_or(Range::all(), |section| section.range())
    }

    fn is_infinite(&self) -> bool {
        self.as_ref().is_some_and(|section| section.is_infinite())
    }

    fn priority(&self) -> i32 {
        self.as_ref().map_or(0, |section| section.priority())
    }

    fn pre_roll(&self) -> T {
        self.as_ref()
            .map_or_else(T::default, |section| section.pre_roll())
    }

    fn post_roll(&self) -> T {
        self.as_ref()
            .map_or_else(T::default, |section| section.post_roll())
    }
}

impl<T: TimeValue, S: TimelineSection<T> + ?Sized> TimelineSection<T> for &S {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn row_index(&self) -> usize {
        (**self).row_index()
    }

    fn range(&self) -> Range<T> {
        (**self).range()
    }

    fn is_infinite(&self) -> bool {
        (**self).is_infinite()
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn pre_roll(&self) -> T {
        (**self).pre_roll()
    }

    fn post_roll(&self) -> T {
        (**self).post_roll()
    }
}

/// Plain section description
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionDef<T> {
    /// Active range
    pub range: Range<T>,
    /// Row index
    pub row: usize,
    /// Overlap priority
    pub priority: i32,
    /// Whether the section takes part in compilation
    pub active: bool,
    /// Covers the whole timeline
    pub infinite: bool,
    /// Pre-roll duration
    pub pre_roll: T,
    /// Post-roll duration
    pub post_roll: T,
}

impl<T: TimeValue> SectionDef<T> {
    /// Active section on row 0 with priority 0 and no roll
    pub fn new(range: Range<T>) -> Self {
        Self {
            range,
            row: 0,
            priority: 0,
            active: true,
            infinite: false,
            pre_roll: T::default(),
            post_roll: T::default(),
        }
    }

    /// Place the section on `row`
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    /// Set the overlap priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set pre- and post-roll durations
    pub fn with_roll(mut self, pre_roll: T, post_roll: T) -> Self {
        self.pre_roll = pre_roll;
        self.post_roll = post_roll;
        self
    }

    /// Mark the section infinite
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    /// Mark the section inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl<T: TimeValue> TimelineSection<T> for SectionDef<T> {
    fn is_active(&self) -> bool {
        self.active
    }

    fn row_index(&self) -> usize {
        self.row
    }

    fn range(&self) -> Range<T> {
        self.range
    }

    fn is_infinite(&self) -> bool {
        self.infinite
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn pre_roll(&self) -> T {
        self.pre_roll
    }

    fn post_roll(&self) -> T {
        self.post_roll
    }
}

fn is_ordered<T: PartialOrd>(value: &T) -> bool {
    value.partial_cmp(value).is_some()
}

fn bound_is_ordered<T: PartialOrd + Copy>(bound: &Bound<T>) -> bool {
    bound.value().map_or(true, |value| is_ordered(&value))
}

/// Check external input before it reaches the asserting segment compiler
///
/// Inactive sections are not checked. Reports the first problem found:
/// unordered bound or roll values (such as NaN), a lower bound past the
/// upper bound, or a negative roll duration.
pub fn validate_sections<T, S>(sections: &[S]) -> Result<()>
where
    T: TimeValue,
    S: TimelineSection<T>,
{
    let zero = T::default();

    for (index, section) in sections.iter().enumerate() {
        if !section.is_active() {
            continue;
        }

        let pre_roll = section.pre_roll();
        let post_roll = section.post_roll();
        if !is_ordered(&pre_roll) || !is_ordered(&post_roll) {
            return Err(EngineError::invalid_section(
                index,
                "roll duration is not comparable",
            ));
        }
        if pre_roll < zero {
            return Err(EngineError::invalid_section(
                index,
                format!("negative pre-roll {pre_roll:?}"),
            ));
        }
        if post_roll < zero {
            return Err(EngineError::invalid_section(
                index,
                format!("negative post-roll {post_roll:?}"),
            ));
        }

        if section.is_infinite() {
            continue;
        }

        let range = section.range();
        if !bound_is_ordered(&range.lower) || !bound_is_ordered(&range.upper) {
            return Err(EngineError::invalid_section(
                index,
                "range bound is not comparable",
            ));
        }
        if let (Some(lower), Some(upper)) = (range.lower.value(), range.upper.value()) {
            if lower.partial_cmp(&upper) == Some(Ordering::Greater) {
                return Err(EngineError::invalid_section(
                    index,
                    format!("lower bound {lower:?} is past upper bound {upper:?}"),
                ));
            }
        }
    }

    Ok(())
}
