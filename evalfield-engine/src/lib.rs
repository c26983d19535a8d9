//! Row/track orchestration for timeline evaluation fields
//!
//! This crate groups timeline entities into rows, compiles each row with its
//! own blending rules, then combines the rows into a single track-level
//! [`EvaluationField`] where earlier rows take precedence.
//!
//! ```rust
//! use evalfield_engine::{Range, RulePolicy, SectionDef, SharedRules, TrackCompiler};
//! use std::sync::Arc;
//!
//! let sections = [
//!     SectionDef::new(Range::closed_open(0.0, 10.0)).with_priority(1),
//!     SectionDef::new(Range::closed_open(5.0, 15.0)).with_priority(2),
//! ];
//! let row_rules: SharedRules<f64> = Arc::new(RulePolicy::highest_priority());
//!
//! let field = TrackCompiler::new()
//!     .compile_sections(&sections, Some(row_rules), None)
//!     .unwrap();
//!
//! assert_eq!(field.len(), 2);
//! assert_eq!(field.segments()[1].range, Range::closed_open(5.0, 15.0));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod field;
pub mod rows;
pub mod section;
pub mod track;

// Re-export key types
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use executor::{ExecutionMode, Executor};
pub use field::EvaluationField;
pub use rows::{build_rows, Row, SectionRowData, SharedRules};
pub use section::{validate_sections, SectionDef, TimeValue, TimelineSection};
pub use track::{compile_track, TrackCompiler};

// Re-export from core for convenience
pub use evalfield_core::{
    BlendMode, Bound, EvaluationData, EvaluationFlags, GapPolicy, Range, RulePolicy, Segment,
    SegmentRules,
};
