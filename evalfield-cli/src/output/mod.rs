//! Output formatting module

use anyhow::Result;
use evalfield_core::{EvaluationData, Segment};
use serde::{Deserialize, Serialize};

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and output a single segment; `labels[i]` names section `i`
    fn format_segment(&mut self, segment: &Segment<f64>, labels: &[String]) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// One reference inside a segment, resolved for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplData {
    /// Section index in the timeline file
    pub index: usize,
    /// Section label, or `#index` when unlabelled
    pub label: String,
    /// Evaluated as pre-roll
    pub pre_roll: bool,
    /// Evaluated as post-roll
    pub post_roll: bool,
    /// Fixed evaluation time set by gap filling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_time: Option<f64>,
}

impl ImplData {
    /// Resolve `data` against the section labels
    pub fn resolve(data: &EvaluationData<f64>, labels: &[String]) -> Self {
        Self {
            index: data.impl_index,
            label: labels
                .get(data.impl_index)
                .cloned()
                .unwrap_or_else(|| format!("#{}", data.impl_index)),
            pre_roll: data.flags.pre_roll,
            post_roll: data.flags.post_roll,
            forced_time: data.forced_time,
        }
    }
}
