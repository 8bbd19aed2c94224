//! Streaming record partitioning
//!
//! This crate reads an unbounded byte stream, cuts it into records that start
//! at a literal pattern, filters and numbers them, and restores their order
//! after they have been transformed in parallel. Each stage runs on its own
//! thread and talks to its neighbours only through bounded queues.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod producer;
pub mod search;
pub mod segmenter;
mod stage;
pub mod types;
pub mod unshuffler;
pub mod workers;

// Re-export key types
pub use config::{EngineConfig, PartitionConfig, PipelineConfig, RecordFilter};
pub use error::{EngineError, ErrorSink, Result};
pub use partition::{partition_text, partition_with, Merger, Splitter};
pub use pipeline::{Pipeline, PipelineBuilder, RunningPipeline};
pub use producer::{create_text_producer, IndexedFilter};
pub use search::{PatternSearch, SearchOptions, StringSearcher};
pub use segmenter::{create_text_streamer, BlockReader};
pub use types::{IndexedRecord, LineBlock};
pub use unshuffler::{create_text_unshuffler, Unshuffler};
pub use workers::spawn_workers;
