//! Compile command implementation

use crate::config::TimelineFile;
use crate::output::{JsonFormatter, OutputFormatter, TextFormatter};
use anyhow::Result;
use clap::Args;
use evalfield_core::Segment;
use std::io::{self, Write};
use std::path::PathBuf;

/// Arguments for the compile command
#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Timeline file (.toml, otherwise JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only print the segment containing this time
    #[arg(long, value_name = "TIME", allow_negative_numbers = true)]
    pub at: Option<f64>,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One segment per line
    Text,
    /// JSON array of segments with resolved sections
    Json,
}

impl CompileArgs {
    /// Execute the compile command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);

        log::info!("Compiling timeline {}", self.input.display());
        log::debug!("Arguments: {:?}", self);

        let stdout = io::stdout();
        self.run(stdout.lock())
    }

    /// Compile the input and write the formatted result to `writer`
    pub fn run<W: Write>(&self, writer: W) -> Result<()> {
        let timeline = TimelineFile::load(&self.input)?;
        let field = timeline.compile()?;

        let labels: Vec<String> = (0..timeline.sections.len())
            .map(|index| timeline.label(index))
            .collect();

        let segments = match self.at {
            Some(time) => field.segment_at(time).into_iter().collect::<Vec<_>>(),
            None => field.segments().iter().collect(),
        };
        log::info!("{} of {} segments selected", segments.len(), field.len());

        match self.format {
            OutputFormat::Text => write_segments(TextFormatter::new(writer), &segments, &labels),
            OutputFormat::Json => write_segments(JsonFormatter::new(writer), &segments, &labels),
        }
    }
}

fn write_segments<F: OutputFormatter>(
    mut formatter: F,
    segments: &[&Segment<f64>],
    labels: &[String],
) -> Result<()> {
    for segment in segments {
        formatter.format_segment(segment, labels)?;
    }
    formatter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_timeline(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn args(input: PathBuf, format: OutputFormat, at: Option<f64>) -> CompileArgs {
        CompileArgs {
            input,
            format,
            at,
            quiet: true,
            verbose: 0,
        }
    }

    const OVERLAP: &str = r#"
[[sections]]
label = "A"
start = 0.0
end = 10.0

[[sections]]
label = "B"
start = 5.0
end = 15.0
"#;

    #[test]
    fn test_text_output() {
        let dir = TempDir::new().unwrap();
        let input = write_timeline(&dir, "overlap.toml", OVERLAP);

        let mut out = Vec::new();
        args(input, OutputFormat::Text, None).run(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[0, 5)\tA");
        assert!(lines[1].starts_with("[5, 10)\t"));
        assert!(lines[1].contains('A') && lines[1].contains('B'));
        assert_eq!(lines[2], "[10, 15)\tB");
    }

    #[test]
    fn test_at_selects_one_segment() {
        let dir = TempDir::new().unwrap();
        let input = write_timeline(&dir, "overlap.toml", OVERLAP);

        let mut out = Vec::new();
        args(input.clone(), OutputFormat::Text, Some(12.0))
            .run(&mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[10, 15)\tB\n");

        let mut out = Vec::new();
        args(input, OutputFormat::Text, Some(-3.0))
            .run(&mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_json_input_and_output() {
        let dir = TempDir::new().unwrap();
        let input = write_timeline(
            &dir,
            "single.json",
            r#"{"sections": [{"label": "only", "start": 1.0, "end": 2.0}]}"#,
        );

        let mut out = Vec::new();
        args(input, OutputFormat::Json, None).run(&mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["range"], "[1, 2)");
        assert_eq!(parsed[0]["sections"][0]["label"], "only");
    }

    #[test]
    fn test_missing_file() {
        let mut out = Vec::new();
        let err = args(PathBuf::from("/nonexistent/timeline.toml"), OutputFormat::Text, None)
            .run(&mut out)
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
