//! Split command implementation

use crate::{
    config::CliConfig,
    error::CliError,
    input::InputSource,
    output::{create_formatter, OutputFormat},
};
use anyhow::{Context, Result};
use clap::Args;
use partext_engine::Pipeline;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Literal text that starts every record
    #[arg(short, long, value_name = "TEXT")]
    pub pattern: Option<String>,

    /// Input file (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep only records containing this text
    #[arg(short, long, value_name = "TEXT")]
    pub require: Option<String>,

    /// Drop records containing this text
    #[arg(short = 'x', long, value_name = "TEXT")]
    pub exclude: Option<String>,

    /// First record position to keep (1-based)
    #[arg(long, value_name = "N")]
    pub min: Option<usize>,

    /// Last record position to keep (1-based)
    #[arg(long, value_name = "N")]
    pub max: Option<usize>,

    /// Ignore ASCII case when matching the pattern and filters
    #[arg(short = 'I', long)]
    pub ignore_case: bool,

    /// Only match the pattern as a whole word
    #[arg(short, long)]
    pub whole_word: bool,

    /// Number of record workers (default: one per CPU)
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Capacity of each queue between stages
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Records to collect before the reassembler checks for the next one
    #[arg(long, value_name = "N")]
    pub heap_delay: Option<usize>,

    /// Transform applied to every record
    #[arg(short, long, value_enum)]
    pub transform: Option<Transform>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Per-record transforms run by the workers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Leave the record unchanged
    #[default]
    Identity,
    /// Uppercase the record
    Upper,
    /// Lowercase the record
    Lower,
    /// Strip leading and trailing whitespace
    Trim,
}

impl Transform {
    /// Apply the transform to one record.
    ///
    /// Valid UTF-8 gets the Unicode case and whitespace rules. Anything else
    /// falls back to their ASCII forms so the other bytes pass through.
    pub fn apply(self, text: &[u8]) -> Vec<u8> {
        if self == Transform::Identity {
            return text.to_vec();
        }

        match std::str::from_utf8(text) {
            Ok(text) => match self {
                Transform::Upper => text.to_uppercase(),
                Transform::Lower => text.to_lowercase(),
                Transform::Trim => text.trim().to_string(),
                Transform::Identity => text.to_string(),
            }
            .into_bytes(),
            Err(_) => match self {
                Transform::Upper => text.to_ascii_uppercase(),
                Transform::Lower => text.to_ascii_lowercase(),
                Transform::Trim => text.trim_ascii().to_vec(),
                Transform::Identity => text.to_vec(),
            },
        }
    }
}

impl SplitArgs {
    /// Execute the split command
    pub fn execute(&self) -> Result<()> {
        self.init_logging();

        log::info!("Starting record partitioning");
        log::debug!("Arguments: {:?}", self);

        let config = self.resolve_config()?;
        if config.partition.pattern.is_empty() {
            return Err(CliError::ConfigError(
                "a record pattern is required (--pattern or [partition] pattern)".to_string(),
            )
            .into());
        }

        let pipeline = Pipeline::from_config(config.pipeline_config())?;
        let source = InputSource::from_arg(self.input.as_deref());
        let reader = source.open()?;

        let transform = config.output.transform;
        let workers = config.engine.worker_count();
        log::info!("Reading {} with {} workers", source.name(), workers);

        let running = pipeline.start(reader, workers, move |record| {
            transform.apply(&record.text)
        })?;

        let mut formatter = create_formatter(config.output.format, self.open_output()?);
        let mut written = 0;
        for text in &running {
            written += 1;
            formatter.format_record(written, &text)?;
        }
        formatter.finish()?;
        log::info!("Wrote {written} records");

        if let Some(err) = running.errors().into_iter().next() {
            return Err(CliError::ProcessingError(err.to_string()).into());
        }

        Ok(())
    }

    /// Merge the configuration file (if any) with command-line overrides
    pub fn resolve_config(&self) -> Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::from_file(path)?,
            None => CliConfig::default(),
        };

        if let Some(pattern) = &self.pattern {
            config.partition.pattern = pattern.clone();
        }
        if let Some(require) = &self.require {
            config.partition.filter.require = Some(require.clone());
        }
        if let Some(exclude) = &self.exclude {
            config.partition.filter.exclude = Some(exclude.clone());
        }
        if let Some(min) = self.min {
            config.partition.filter.min = min;
        }
        if let Some(max) = self.max {
            config.partition.filter.max = max;
        }
        if self.ignore_case {
            config.partition.options.case_sensitive = false;
        }
        if self.whole_word {
            config.partition.options.whole_word = true;
        }
        if let Some(workers) = self.workers {
            config.engine.workers = Some(workers);
        }
        if let Some(capacity) = self.queue_capacity {
            config.engine.queue_capacity = capacity;
        }
        if let Some(delay) = self.heap_delay {
            config.engine.heap_delay = delay;
        }
        if let Some(transform) = self.transform {
            config.output.transform = transform;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }

        config.engine.validate()?;
        Ok(config)
    }

    fn open_output(&self) -> Result<Box<dyn Write + Send + Sync>> {
        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            None => Ok(Box::new(BufWriter::new(io::stdout()))),
        }
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        // a logger may already be installed when run from tests
        let env = env_logger::Env::default().default_filter_or(log_level);
        let _ = env_logger::Builder::from_env(env).try_init();
    }
}
