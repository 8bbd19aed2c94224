//! Configuration module

use crate::{commands::split::Transform, output::OutputFormat};
use anyhow::{Context, Result};
use partext_engine::{EngineConfig, PartitionConfig, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Record pattern and filters
    #[serde(default)]
    pub partition: PartitionConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Transform applied to every record by the workers
    pub transform: Transform,
}

impl CliConfig {
    /// Load a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// The engine-facing part of the configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            engine: self.engine.clone(),
            partition: self.partition.clone(),
        }
    }
}
