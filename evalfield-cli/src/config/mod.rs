//! Timeline file model
//!
//! A timeline file lists sections plus optional engine and rules tables.
//! Files ending in `.toml` are read as TOML, anything else as JSON.
//!
//! ```toml
//! [engine]
//! execution_mode = "sequential"
//!
//! [rules.row]
//! blend = "highest_priority"
//!
//! [[sections]]
//! label = "intro"
//! start = 0.0
//! end = 10.0
//! priority = 1
//! ```

use crate::error::CliError;
use anyhow::{Context, Result};
use evalfield_core::{Bound, Range, RulePolicy, SegmentRules};
use evalfield_engine::{EngineConfig, EvaluationField, SharedRules, TimelineSection, TrackCompiler};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Parsed timeline file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimelineFile {
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Row and track rules
    #[serde(default)]
    pub rules: RulesConfig,

    /// Sections in entity order
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
}

/// Rules applied at each compilation level; absent means none
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Rules for every row
    pub row: Option<RulePolicy>,
    /// Rules for the combined track
    pub track: Option<RulePolicy>,
}

/// One section of the timeline, active over `[start, end)`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionEntry {
    /// Display name
    #[serde(default)]
    pub label: Option<String>,
    /// Inclusive start; missing means unbounded
    #[serde(default)]
    pub start: Option<f64>,
    /// Exclusive end; missing means unbounded
    #[serde(default)]
    pub end: Option<f64>,
    /// Covers the whole timeline
    #[serde(default)]
    pub infinite: bool,
    /// Row index
    #[serde(default)]
    pub row: usize,
    /// Overlap priority
    #[serde(default)]
    pub priority: i32,
    /// Whether the section is compiled
    #[serde(default = "default_active")]
    pub active: bool,
    /// Pre-roll duration
    #[serde(default)]
    pub pre_roll: f64,
    /// Post-roll duration
    #[serde(default)]
    pub post_roll: f64,
}

fn default_active() -> bool {
    true
}

impl TimelineSection<f64> for SectionEntry {
    fn is_active(&self) -> bool {
        self.active
    }

    fn row_index(&self) -> usize {
        self.row
    }

    fn range(&self) -> Range<f64> {
        Range::new(
            self.start.map_or(Bound::Open, Bound::Inclusive),
            self.end.map_or(Bound::Open, Bound::Exclusive),
        )
    }

    fn is_infinite(&self) -> bool {
        self.infinite
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn pre_roll(&self) -> f64 {
        self.pre_roll
    }

    fn post_roll(&self) -> f64 {
        self.post_roll
    }
}

impl TimelineFile {
    /// Load a timeline file, picking the format from the extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };

        parsed.with_context(|| format!("Failed to load timeline: {}", path.display()))
    }

    /// Parse TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::ParseError(e.to_string()).into())
    }

    /// Parse JSON content
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CliError::ParseError(e.to_string()).into())
    }

    /// Display name of the section at `index`
    pub fn label(&self, index: usize) -> String {
        self.sections
            .get(index)
            .and_then(|section| section.label.clone())
            .unwrap_or_else(|| format!("#{index}"))
    }

    /// Check engine settings and sections without compiling
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .and_then(|()| evalfield_engine::validate_sections(&self.sections))
            .map_err(|e| CliError::InvalidTimeline(e.to_string()).into())
    }

    /// Compile the sections into an evaluation field
    pub fn compile(&self) -> Result<EvaluationField<f64>> {
        self.validate()?;

        let compiler = TrackCompiler::with_config(self.engine.clone())?;
        let row_rules = self
            .rules
            .row
            .map(|policy| -> SharedRules<f64> { Arc::new(policy) });
        let track_rules: Option<&dyn SegmentRules<f64>> =
            self.rules.track.as_ref().map(|policy| policy as _);

        log::info!(
            "compiling {} sections ({:?} row rules, {:?} track rules)",
            self.sections.len(),
            self.rules.row,
            self.rules.track
        );

        let field = compiler.compile_sections(&self.sections, row_rules, track_rules)?;
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalfield_core::BlendMode;
    use evalfield_engine::ExecutionMode;

    const SAMPLE_TOML: &str = r#"
[engine]
execution_mode = "sequential"

[rules.row]
blend = "highest_priority"

[[sections]]
label = "A"
start = 0.0
end = 10.0
priority = 1

[[sections]]
label = "B"
start = 5.0
end = 15.0
priority = 2
"#;

    #[test]
    fn test_parse_toml() {
        let file = TimelineFile::from_toml_str(SAMPLE_TOML).unwrap();
        assert_eq!(file.engine.execution_mode, ExecutionMode::Sequential);
        assert_eq!(file.rules.row.map(|p| p.blend), Some(BlendMode::HighestPriority));
        assert!(file.rules.track.is_none());
        assert_eq!(file.sections.len(), 2);
        assert!(file.sections[0].active);
        assert_eq!(file.sections[1].range(), Range::closed_open(5.0, 15.0));
    }

    #[test]
    fn test_parse_json_with_open_bounds() {
        let file = TimelineFile::from_json_str(
            r#"{"sections": [{"start": 3.0}, {"end": 1.0, "active": false}]}"#,
        )
        .unwrap();
        assert_eq!(file.sections[0].range(), Range::at_least(3.0));
        assert_eq!(file.sections[1].range(), Range::less_than(1.0));
        assert!(!file.sections[1].is_active());
        assert_eq!(file.engine, EngineConfig::default());
    }

    #[test]
    fn test_compile_sample() {
        let file = TimelineFile::from_toml_str(SAMPLE_TOML).unwrap();
        let field = file.compile().unwrap();
        assert_eq!(field.len(), 2);
        assert_eq!(field.segments()[1].range, Range::closed_open(5.0, 15.0));
        assert_eq!(file.label(1), "B");
        assert_eq!(file.label(7), "#7");
    }

    #[test]
    fn test_parse_error() {
        let err = TimelineFile::from_toml_str("sections = 3").unwrap_err();
        assert!(err.to_string().starts_with("Parse error:"));
    }

    #[test]
    fn test_validation_error() {
        let file =
            TimelineFile::from_json_str(r#"{"sections": [{"start": 5.0, "end": 1.0}]}"#).unwrap();
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("invalid section at index 0"));
    }
}
