//! partext command-line entry point

use anyhow::Result;
use clap::Parser;
use partext_cli::commands::Commands;

/// Split a text stream into records at a literal pattern
#[derive(Debug, Parser)]
#[command(name = "partext", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
