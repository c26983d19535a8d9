//! Interval segment compilation for timeline evaluation
//!
//! This crate turns a set of possibly overlapping, possibly infinite time
//! intervals into a minimal, ordered, non-overlapping partition of the
//! timeline. Every output [`Segment`] lists exactly the intervals active over
//! its sub-range, so an evaluator can find "what evaluates when" with a
//! single lookup.
//!
//! # Architecture
//!
//! - **Bound algebra** ([`range`]): open / inclusive / exclusive bounds and
//!   the range operations built on them
//! - **Segment compiler** ([`compiler`]): the sweep-line partitioner
//! - **Rules** ([`rules`]): pluggable blending and gap filling applied to
//!   compiled segments
//!
//! # Example
//!
//! ```rust
//! use evalfield_core::{compile_segments, EvaluationData, Range, SectionData};
//!
//! let sections = [
//!     SectionData::new(Range::closed_open(0.0, 10.0), EvaluationData::new(0), 1),
//!     SectionData::new(Range::closed_open(5.0, 15.0), EvaluationData::new(1), 2),
//! ];
//!
//! let segments = compile_segments(&sections);
//! let overlap: Vec<usize> = segments[1].impl_indices().collect();
//! assert_eq!(segments[1].range, Range::closed_open(5.0, 10.0));
//! assert_eq!(overlap, vec![0, 1]);
//! ```

#![warn(missing_docs)]

pub mod compiler;
pub mod range;
pub mod rules;
pub mod segment;

pub use compiler::{compile_segments, compile_segments_with, SegmentCompiler};
pub use range::{Bound, Position, Range};
pub use rules::{
    evaluate_nearest_segment, BlendMode, DefaultRules, GapPolicy, RulePolicy, SegmentRules,
};
pub use segment::{EvaluationData, EvaluationFlags, ImplList, SectionData, Segment};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _bound: Bound<f64> = Bound::Open;
        let _range: Range<f64> = Range::all();
        let _eval: EvaluationData<f64> = EvaluationData::new(0);
        let _flags = EvaluationFlags::PRE_ROLL;
        let _compiler: SegmentCompiler<f64> = SegmentCompiler::new();
        let _rules: &dyn SegmentRules<f64> = &DefaultRules;
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_rule_policy_deserializes_with_defaults() {
        let policy: RulePolicy = serde_json::from_str(r#"{"blend": "highest_priority"}"#).unwrap();
        assert_eq!(policy, RulePolicy::highest_priority());

        let policy: RulePolicy =
            serde_json::from_str(r#"{"gaps": "marker", "allow_empty_segments": true}"#).unwrap();
        assert_eq!(policy.blend, BlendMode::All);
        assert_eq!(policy.gaps, GapPolicy::Marker);
        assert!(policy.allow_empty_segments);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_segment_serializes() {
        let segment = Segment::new(Range::closed_open(0.0, 1.0), [EvaluationData::new(2)]);
        let json = serde_json::to_string(&segment).unwrap();
        let back: Segment<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segment);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_section_deserializes_without_optional_fields() {
        let json = r#"{
            "range": {"lower": {"Inclusive": 1}, "upper": "Open"},
            "eval": {"impl_index": 4},
            "priority": 2
        }"#;
        let section: SectionData<i64> = serde_json::from_str(json).unwrap();
        assert_eq!(section.range, Range::at_least(1));
        assert_eq!(section.eval, EvaluationData::new(4));
        assert_eq!(section.priority, 2);
    }
}
