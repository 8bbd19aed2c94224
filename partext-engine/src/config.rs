//! Configuration types for the engine

use crate::{
    error::{EngineError, Result},
    search::SearchOptions,
    segmenter::{READ_SIZE, RESERVE_SIZE},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default capacity of every inter-stage queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default number of arrivals between reassembler checks
pub const DEFAULT_HEAP_DELAY: usize = 16;

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of each bounded queue between stages
    pub queue_capacity: usize,
    /// Arrivals the reassembler buffers before checking for the next index
    pub heap_delay: usize,
    /// Bytes requested per read from the source
    pub read_size: usize,
    /// Space reserved for carrying an unterminated line into the next read
    pub reserve_size: usize,
    /// Number of record workers (None = auto)
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heap_delay: DEFAULT_HEAP_DELAY,
            read_size: READ_SIZE,
            reserve_size: RESERVE_SIZE,
            workers: None,
        }
    }
}

impl EngineConfig {
    /// Release every record as soon as its predecessors are in
    pub fn low_latency() -> Self {
        Self {
            heap_delay: 0,
            ..Self::default()
        }
    }

    /// Deeper queues and fewer reassembler checks
    pub fn throughput() -> Self {
        Self {
            queue_capacity: 64,
            heap_delay: 64,
            ..Self::default()
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.read_size == 0 {
            return Err(EngineError::ConfigError(
                "read_size must be greater than 0".to_string(),
            ));
        }
        if self.reserve_size == 0 {
            return Err(EngineError::ConfigError(
                "reserve_size must be greater than 0".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(EngineError::ConfigError(
                "workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker count, resolving `None` to the number of CPUs
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(count) => count.max(1),
            #[cfg(feature = "parallel")]
            None => num_cpus::get(),
            #[cfg(not(feature = "parallel"))]
            None => 1,
        }
    }
}

/// Which records to keep, by content and by position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Drop records that do not contain this text
    pub require: Option<String>,
    /// Drop records that contain this text
    pub exclude: Option<String>,
    /// First record position to keep, 1-based (0 = no lower bound)
    pub min: usize,
    /// Last record position to keep, 1-based (0 = no upper bound)
    pub max: usize,
}

impl RecordFilter {
    /// Whether any test is configured
    pub fn is_active(&self) -> bool {
        self.require.as_deref().is_some_and(|s| !s.is_empty())
            || self.exclude.as_deref().is_some_and(|s| !s.is_empty())
            || self.min > 0
            || self.max > 0
    }
}

/// How the stream is cut into records and which records survive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Literal text that starts every record
    pub pattern: String,
    /// Matching semantics for the pattern and the filters
    pub options: SearchOptions,
    /// Content and range filters
    pub filter: RecordFilter,
}

impl PartitionConfig {
    /// Partition on `pattern` with no filtering
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }
}

/// Complete pipeline configuration as stored in a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Engine tuning
    pub engine: EngineConfig,
    /// Record partitioning and filtering
    pub partition: PartitionConfig,
}

impl PipelineConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load and parse a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
