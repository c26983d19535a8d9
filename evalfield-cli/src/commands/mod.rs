//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod compile;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a timeline file into evaluation segments
    Compile(compile::CompileArgs),

    /// Check a timeline file without compiling it
    Validate(validate::ValidateArgs),
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Compile(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

/// Initialize logging based on verbosity level
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // A logger may already be installed when commands run in-process
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_commands_debug_format() {
        let compile = Commands::Compile(compile::CompileArgs {
            input: PathBuf::from("timeline.toml"),
            format: compile::OutputFormat::Text,
            at: None,
            quiet: false,
            verbose: 0,
        });
        let debug_str = format!("{:?}", compile);
        assert!(debug_str.contains("Compile"));
        assert!(debug_str.contains("timeline.toml"));

        let validate = Commands::Validate(validate::ValidateArgs {
            input: PathBuf::from("timeline.json"),
        });
        assert!(format!("{:?}", validate).contains("Validate"));
    }
}
