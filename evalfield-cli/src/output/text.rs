//! Plain text output formatter

use super::{ImplData, OutputFormatter};
use anyhow::Result;
use evalfield_core::Segment;
use std::io::{self, Write};

/// Plain text formatter - outputs one segment per line
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the formatter and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

fn describe(data: &ImplData) -> String {
    let mut text = data.label.clone();
    if data.pre_roll {
        text.push_str(" (pre-roll)");
    }
    if data.post_roll {
        text.push_str(" (post-roll)");
    }
    if let Some(time) = data.forced_time {
        text.push_str(&format!(" @{time}"));
    }
    text
}

impl<W: Write> OutputFormatter for TextFormatter<W> {
    fn format_segment(&mut self, segment: &Segment<f64>, labels: &[String]) -> Result<()> {
        let impls: Vec<String> = segment
            .impls
            .iter()
            .map(|data| describe(&ImplData::resolve(data, labels)))
            .collect();
        let impls = if impls.is_empty() {
            "-".to_string()
        } else {
            impls.join(", ")
        };
        writeln!(self.writer, "{}\t{}", segment.range, impls)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
