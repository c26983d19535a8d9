//! Validate command implementation

use crate::config::TimelineFile;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Timeline file to validate
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating timeline: {}", self.input.display());

        let result = TimelineFile::load(&self.input).and_then(|timeline| {
            timeline.validate()?;
            Ok(timeline)
        });

        match result {
            Ok(timeline) => {
                let active = timeline.sections.iter().filter(|s| s.active).count();
                println!("✓ Timeline is valid!");
                println!("  Sections: {} ({} active)", timeline.sections.len(), active);
                println!("  Execution mode: {:?}", timeline.engine.execution_mode);
                Ok(())
            }
            Err(e) => {
                println!("✗ Timeline is invalid!");
                println!("  Error: {e:#}");
                Err(anyhow::anyhow!("Validation failed: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn timeline_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_validate_valid_timeline() {
        let file = timeline_file(
            r#"
[[sections]]
start = 0.0
end = 4.0
pre_roll = 1.0
"#,
        );
        let args = ValidateArgs {
            input: file.path().to_path_buf(),
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_validate_negative_roll() {
        let file = timeline_file(
            r#"
[[sections]]
start = 0.0
end = 4.0
post_roll = -1.0
"#,
        );
        let args = ValidateArgs {
            input: file.path().to_path_buf(),
        };
        assert!(args.execute().is_err());
    }

    #[test]
    fn test_validate_bad_engine_config() {
        let file = timeline_file(
            r#"
[engine]
threads = 0
"#,
        );
        let args = ValidateArgs {
            input: file.path().to_path_buf(),
        };
        assert!(args.execute().is_err());
    }
}
