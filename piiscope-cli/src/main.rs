//! piiscope command-line entry point

use anyhow::Result;
use clap::Parser;
use piiscope_cli::commands::Commands;

/// Find personally identifiable information in text files
#[derive(Debug, Parser)]
#[command(name = "piiscope", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
