//! Validate command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(short = 'c', long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match CliConfig::from_file(&self.config) {
            Ok(config) => {
                println!("✓ Configuration is valid!");
                if config.partition.pattern.is_empty() {
                    println!("  Pattern: <none, pass --pattern when splitting>");
                } else {
                    println!("  Pattern: {:?}", config.partition.pattern);
                }
                let filter = &config.partition.filter;
                if filter.is_active() {
                    println!(
                        "  Filter: require {:?}, exclude {:?}, positions {}..={}",
                        filter.require, filter.exclude, filter.min, filter.max
                    );
                } else {
                    println!("  Filter: <none, every record is kept>");
                }
                println!("  Queue capacity: {}", config.engine.queue_capacity);
                println!("  Heap delay: {}", config.engine.heap_delay);
                println!("  Workers: {}", config.engine.worker_count());
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e:#}");
                Err(anyhow::anyhow!("Validation failed: {:#}", e))
            }
        }
    }
}
