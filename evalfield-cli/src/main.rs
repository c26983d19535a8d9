//! evalfield command-line entry point

use anyhow::Result;
use clap::Parser;
use evalfield_cli::commands::Commands;

/// Compile timeline sections into ordered evaluation segments
#[derive(Debug, Parser)]
#[command(name = "evalfield", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
