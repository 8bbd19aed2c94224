//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use partext_engine::config::{DEFAULT_HEAP_DELAY, DEFAULT_QUEUE_CAPACITY};
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Record pattern to put in the template
    #[arg(short, long, value_name = "TEXT")]
    pub pattern: Option<String>,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        let template = self.generate_template();

        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Set the record pattern and filters");
        println!("2. Validate your configuration:");
        println!("   partext validate --config {}", self.output.display());
        println!("3. Use it for splitting:");
        println!(
            "   partext split -i input.txt --config {}",
            self.output.display()
        );

        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> String {
        let pattern = toml::Value::String(self.pattern.clone().unwrap_or_default());

        format!(
            r#"# partext configuration

[engine]
# Capacity of every queue between pipeline stages
queue_capacity = {DEFAULT_QUEUE_CAPACITY}

# Records the reassembler collects before looking for the next index.
# 0 releases every record as early as possible.
heap_delay = {DEFAULT_HEAP_DELAY}

# Bytes requested per read, and room kept for a carried partial line
read_size = 65536
reserve_size = 16384

# Number of record workers (default: one per CPU)
# workers = 4

[partition]
# Literal text that starts every record (required)
pattern = {pattern}

[partition.options]
case_sensitive = true
whole_word = false

[partition.filter]
# Keep only records containing this text
# require = ""

# Drop records containing this text
# exclude = ""

# Keep records at positions min..=max (0 leaves the bound open)
min = 0
max = 0

[output]
# text or json
format = "text"

# identity, upper, lower or trim
transform = "identity"
"#
        )
    }
}
