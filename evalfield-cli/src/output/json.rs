//! JSON output formatter

use super::{ImplData, OutputFormatter};
use anyhow::Result;
use evalfield_core::{Bound, Segment};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// JSON formatter - outputs segments as JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    segments: Vec<SegmentData>,
}

/// Data structure for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentData {
    /// Range in interval notation
    pub range: String,
    /// Lower bound value; absent when unbounded
    pub start: Option<f64>,
    /// Upper bound value; absent when unbounded
    pub end: Option<f64>,
    /// Whether `start` is part of the segment
    pub start_inclusive: bool,
    /// Whether `end` is part of the segment
    pub end_inclusive: bool,
    /// Sections evaluated over the segment
    pub sections: Vec<ImplData>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            segments: Vec::new(),
        }
    }

    /// Consume the formatter and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputFormatter for JsonFormatter<W> {
    fn format_segment(&mut self, segment: &Segment<f64>, labels: &[String]) -> Result<()> {
        let range = segment.range;
        self.segments.push(SegmentData {
            range: range.to_string(),
            start: range.lower.value(),
            end: range.upper.value(),
            start_inclusive: matches!(range.lower, Bound::Inclusive(_)),
            end_inclusive: matches!(range.upper, Bound::Inclusive(_)),
            sections: segment
                .impls
                .iter()
                .map(|data| ImplData::resolve(data, labels))
                .collect(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.segments)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
