//! Bound algebra over one-dimensional ranges
//!
//! A [`Range`] is a pair of [`Bound`]s over any partially ordered, copyable
//! domain (usually `f64` time). Bounds are open (unbounded), inclusive or
//! exclusive; all orderings below break ties between equal values by
//! inclusivity, so `[0, 5)` and `[5, 10)` touch without overlapping.

use core::cmp::Ordering;
use core::fmt;

/// Values usable as positions on a timeline
///
/// Blanket-implemented for every copyable, partially ordered, debuggable
/// type; `f64` seconds and integer frame numbers both qualify.
pub trait Position: Copy + PartialOrd + fmt::Debug {}

impl<T: Copy + PartialOrd + fmt::Debug> Position for T {}

/// One endpoint of a [`Range`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound<T> {
    /// Unbounded on this side
    Open,
    /// Closed bound that includes its value
    Inclusive(T),
    /// Closed bound that excludes its value
    Exclusive(T),
}

impl<T> Default for Bound<T> {
    fn default() -> Self {
        Bound::Open
    }
}

impl<T: Copy + PartialOrd> Bound<T> {
    /// True for [`Bound::Open`]
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, Bound::Open)
    }

    /// True for inclusive and exclusive bounds
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// True for [`Bound::Inclusive`]
    #[inline]
    pub fn is_inclusive(&self) -> bool {
        matches!(self, Bound::Inclusive(_))
    }

    /// True for [`Bound::Exclusive`]
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Bound::Exclusive(_))
    }

    /// The bound value, `None` when open
    #[inline]
    pub fn value(&self) -> Option<T> {
        match *self {
            Bound::Open => None,
            Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
        }
    }

    /// Swap inclusive and exclusive, keeping the value
    ///
    /// Applied to an upper bound this yields the lower bound that starts
    /// immediately after it (and vice versa), which is how adjoining ranges
    /// are built from a single boundary value.
    ///
    /// ```rust
    /// use evalfield_core::Bound;
    ///
    /// assert_eq!(Bound::Exclusive(5.0).flip_inclusion(), Bound::Inclusive(5.0));
    /// assert_eq!(Bound::<f64>::Open.flip_inclusion(), Bound::Open);
    /// ```
    #[inline]
    pub fn flip_inclusion(self) -> Self {
        match self {
            Bound::Open => Bound::Open,
            Bound::Inclusive(v) => Bound::Exclusive(v),
            Bound::Exclusive(v) => Bound::Inclusive(v),
        }
    }

    /// Total order over bounds used as lower bounds
    ///
    /// Open sorts first; at equal values an inclusive bound reaches further
    /// left than an exclusive one.
    pub fn cmp_lower(a: &Self, b: &Self) -> Ordering {
        match (a, b) {
            (Bound::Open, Bound::Open) => Ordering::Equal,
            (Bound::Open, _) => Ordering::Less,
            (_, Bound::Open) => Ordering::Greater,
            _ => cmp_closed(a, b, |a_inclusive, b_inclusive| {
                // inclusive < exclusive
                b_inclusive.cmp(&a_inclusive)
            }),
        }
    }

    /// Total order over bounds used as upper bounds
    ///
    /// Open sorts last; at equal values an exclusive bound stops earlier
    /// than an inclusive one.
    pub fn cmp_upper(a: &Self, b: &Self) -> Ordering {
        match (a, b) {
            (Bound::Open, Bound::Open) => Ordering::Equal,
            (Bound::Open, _) => Ordering::Greater,
            (_, Bound::Open) => Ordering::Less,
            _ => cmp_closed(a, b, |a_inclusive, b_inclusive| {
                // exclusive < inclusive
                a_inclusive.cmp(&b_inclusive)
            }),
        }
    }

    /// The lower bound reaching furthest left; ties return `a`
    pub fn min_lower(a: Self, b: Self) -> Self {
        if Self::cmp_lower(&a, &b) == Ordering::Greater {
            b
        } else {
            a
        }
    }

    /// The lower bound reaching furthest right; ties return `a`
    pub fn max_lower(a: Self, b: Self) -> Self {
        if Self::cmp_lower(&a, &b) == Ordering::Less {
            b
        } else {
            a
        }
    }

    /// The upper bound stopping earliest; ties return `a`
    pub fn min_upper(a: Self, b: Self) -> Self {
        if Self::cmp_upper(&a, &b) == Ordering::Greater {
            b
        } else {
            a
        }
    }

    /// The upper bound stopping latest; ties return `a`
    pub fn max_upper(a: Self, b: Self) -> Self {
        if Self::cmp_upper(&a, &b) == Ordering::Less {
            b
        } else {
            a
        }
    }
}

/// Compare two closed bounds by value, resolving equal values with `tie`
fn cmp_closed<T, F>(a: &Bound<T>, b: &Bound<T>, tie: F) -> Ordering
where
    T: Copy + PartialOrd,
    F: FnOnce(bool, bool) -> Ordering,
{
    let (Some(va), Some(vb)) = (a.value(), b.value()) else {
        return Ordering::Equal;
    };
    match va.partial_cmp(&vb) {
        Some(Ordering::Less) => Ordering::Less,
        Some(Ordering::Greater) => Ordering::Greater,
        // Unordered values (NaN) are rejected upstream; treat them as ties
        _ => tie(a.is_inclusive(), b.is_inclusive()),
    }
}

/// A contiguous range between a lower and an upper [`Bound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range<T> {
    /// Lower bound
    pub lower: Bound<T>,
    /// Upper bound
    pub upper: Bound<T>,
}

impl<T: Copy + PartialOrd> Range<T> {
    /// Create a range from explicit bounds
    #[inline]
    pub const fn new(lower: Bound<T>, upper: Bound<T>) -> Self {
        Self { lower, upper }
    }

    /// The unbounded range `(-inf, +inf)`
    #[inline]
    pub const fn all() -> Self {
        Self::new(Bound::Open, Bound::Open)
    }

    /// Half-open range `[start, end)`
    #[inline]
    pub const fn closed_open(start: T, end: T) -> Self {
        Self::new(Bound::Inclusive(start), Bound::Exclusive(end))
    }

    /// Closed range `[start, end]`
    #[inline]
    pub const fn inclusive(start: T, end: T) -> Self {
        Self::new(Bound::Inclusive(start), Bound::Inclusive(end))
    }

    /// Open range `(start, end)`
    #[inline]
    pub const fn exclusive(start: T, end: T) -> Self {
        Self::new(Bound::Exclusive(start), Bound::Exclusive(end))
    }

    /// `[start, +inf)`
    #[inline]
    pub const fn at_least(start: T) -> Self {
        Self::new(Bound::Inclusive(start), Bound::Open)
    }

    /// `(start, +inf)`
    #[inline]
    pub const fn greater_than(start: T) -> Self {
        Self::new(Bound::Exclusive(start), Bound::Open)
    }

    /// `(-inf, end]`
    #[inline]
    pub const fn at_most(end: T) -> Self {
        Self::new(Bound::Open, Bound::Inclusive(end))
    }

    /// `(-inf, end)`
    #[inline]
    pub const fn less_than(end: T) -> Self {
        Self::new(Bound::Open, Bound::Exclusive(end))
    }

    /// True if no value lies inside the range
    ///
    /// ```rust
    /// use evalfield_core::Range;
    ///
    /// assert!(Range::closed_open(5.0, 5.0).is_empty());
    /// assert!(!Range::inclusive(5.0, 5.0).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        match (self.lower.value(), self.upper.value()) {
            (Some(lower), Some(upper)) => match lower.partial_cmp(&upper) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => self.lower.is_exclusive() || self.upper.is_exclusive(),
                _ => false,
            },
            _ => false,
        }
    }

    /// True if `value` lies inside the range
    pub fn contains_value(&self, value: T) -> bool {
        let above_lower = match self.lower {
            Bound::Open => true,
            Bound::Inclusive(v) => value >= v,
            Bound::Exclusive(v) => value > v,
        };
        let below_upper = match self.upper {
            Bound::Open => true,
            Bound::Inclusive(v) => value <= v,
            Bound::Exclusive(v) => value < v,
        };
        above_lower && below_upper
    }

    /// True if `other` lies entirely inside this range
    pub fn contains(&self, other: &Self) -> bool {
        Bound::cmp_lower(&self.lower, &other.lower) != Ordering::Greater
            && Bound::cmp_upper(&self.upper, &other.upper) != Ordering::Less
    }

    /// The overlap of two ranges (possibly empty)
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(
            Bound::max_lower(self.lower, other.lower),
            Bound::min_upper(self.upper, other.upper),
        )
    }

    /// True if the ranges share at least one value
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// The smallest range enclosing both; an empty operand yields the other
    pub fn hull(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(
            Bound::min_lower(self.lower, other.lower),
            Bound::max_upper(self.upper, other.upper),
        )
    }

    /// True if the ranges touch with neither a gap nor an overlap
    ///
    /// ```rust
    /// use evalfield_core::Range;
    ///
    /// let a = Range::closed_open(0.0, 5.0);
    /// let b = Range::closed_open(5.0, 10.0);
    /// assert!(a.adjoins(&b));
    /// assert!(b.adjoins(&a));
    /// assert!(!a.adjoins(&Range::inclusive(4.0, 10.0)));
    /// ```
    pub fn adjoins(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        touches(self.upper, other.lower) || touches(other.upper, self.lower)
    }
}

/// True if `lower` starts exactly where `upper` ends
fn touches<T: Copy + PartialOrd>(upper: Bound<T>, lower: Bound<T>) -> bool {
    upper.is_closed() && upper.flip_inclusion() == lower
}

impl<T: Copy + PartialOrd> Default for Range<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Open => write!(f, "(-inf")?,
            Bound::Inclusive(v) => write!(f, "[{v}")?,
            Bound::Exclusive(v) => write!(f, "({v}")?,
        }
        match &self.upper {
            Bound::Open => write!(f, ", +inf)"),
            Bound::Inclusive(v) => write!(f, ", {v}]"),
            Bound::Exclusive(v) => write!(f, ", {v})"),
        }
    }
}
