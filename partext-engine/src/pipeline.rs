//! End-to-end pipeline wiring
//!
//! ```text
//! reader -> text-streamer -> text-producer -> workers -> text-unshuffler -> output
//! ```
//!
//! Every arrow is a bounded queue of `queue_capacity` items.

use crate::{
    config::{EngineConfig, PartitionConfig, PipelineConfig},
    error::{EngineError, ErrorSink, Result},
    partition::partition_text,
    producer::create_text_producer,
    search::SearchOptions,
    segmenter::create_text_streamer,
    types::IndexedRecord,
    unshuffler::create_text_unshuffler,
    workers::spawn_workers,
};
use crossbeam_channel::{Iter, Receiver};
use std::io::Read;
use std::ops::ControlFlow;

/// A configured partitioning pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    engine: EngineConfig,
    partition: PartitionConfig,
}

impl Pipeline {
    /// Create a pipeline, validating the engine settings
    pub fn new(engine: EngineConfig, partition: PartitionConfig) -> Result<Self> {
        engine.validate()?;
        Ok(Self { engine, partition })
    }

    /// Create a pipeline from a loaded configuration file
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        Self::new(config.engine, config.partition)
    }

    /// Start building a pipeline
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Engine settings
    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    /// Partitioning settings
    pub fn partition_config(&self) -> &PartitionConfig {
        &self.partition
    }

    /// Run `reader` through every stage, transforming each surviving record
    /// with `transform` on `workers` parallel workers.
    ///
    /// Returns as soon as the stages are running; read the output from the
    /// returned handle.
    pub fn start<R, F>(&self, reader: R, workers: usize, transform: F) -> Result<RunningPipeline>
    where
        R: Read + Send + 'static,
        F: Fn(&IndexedRecord) -> Vec<u8> + Send + Sync + 'static,
    {
        let (sink, errors) = ErrorSink::new();
        let capacity = self.engine.queue_capacity;

        let blocks = create_text_streamer(reader, &self.engine, sink.clone())?;
        let records = create_text_producer(&self.partition, &self.engine, blocks, sink)?;
        let results = spawn_workers(records, workers, capacity, transform)?;
        let output = create_text_unshuffler(results, &self.engine)?;

        Ok(RunningPipeline { output, errors })
    }

    /// Run with the configured worker count, passing record text through
    /// unchanged
    pub fn start_identity<R>(&self, reader: R) -> Result<RunningPipeline>
    where
        R: Read + Send + 'static,
    {
        self.start(reader, self.engine.worker_count(), |record| record.text.clone())
    }

    /// Split `reader` into records without filtering, indexing or workers.
    ///
    /// The first read error, if any, is returned after the records read
    /// before it have been discarded.
    pub fn partition<R>(&self, reader: R) -> Result<Vec<Vec<u8>>>
    where
        R: Read + Send + 'static,
    {
        let (sink, errors) = ErrorSink::new();
        let blocks = create_text_streamer(reader, &self.engine, sink)?;

        let mut records = Vec::new();
        partition_text(
            &self.partition.pattern,
            self.partition.options,
            self.engine.queue_capacity,
            blocks,
            |record| {
                records.push(record);
                ControlFlow::Continue(())
            },
        )?;

        match errors.try_recv() {
            Ok(err) => Err(err),
            Err(_) => Ok(records),
        }
    }
}

/// Handle to a started pipeline.
///
/// Dropping the handle closes the output queue. Every stage notices on its
/// next send and stops, so an endless source is not read any further.
#[derive(Debug)]
pub struct RunningPipeline {
    output: Receiver<Vec<u8>>,
    errors: Receiver<EngineError>,
}

impl RunningPipeline {
    /// Ordered output queue; closes once every stage has finished
    pub fn output(&self) -> &Receiver<Vec<u8>> {
        &self.output
    }

    /// Blocking iterator over the ordered output
    pub fn iter(&self) -> Iter<'_, Vec<u8>> {
        self.output.iter()
    }

    /// Errors reported by stages so far
    pub fn errors(&self) -> Vec<EngineError> {
        self.errors.try_iter().collect()
    }

    /// Wait for all output. Fails with the first reported error, if any.
    pub fn collect_output(self) -> Result<Vec<Vec<u8>>> {
        let output: Vec<Vec<u8>> = self.output.iter().collect();
        match self.errors.try_recv() {
            Ok(err) => Err(err),
            Err(_) => Ok(output),
        }
    }
}

impl<'a> IntoIterator for &'a RunningPipeline {
    type Item = Vec<u8>;
    type IntoIter = Iter<'a, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builder for [`Pipeline`]
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    engine: EngineConfig,
    partition: PartitionConfig,
}

impl PipelineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the engine settings
    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Literal text that starts every record
    pub fn pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.partition.pattern = pattern.into();
        self
    }

    /// Pattern and filter matching semantics
    pub fn search_options(mut self, options: SearchOptions) -> Self {
        self.partition.options = options;
        self
    }

    /// Fold ASCII case when matching
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.partition.options.case_sensitive = !ignore;
        self
    }

    /// Only keep records containing `text`
    pub fn require<S: Into<String>>(mut self, text: S) -> Self {
        self.partition.filter.require = Some(text.into());
        self
    }

    /// Drop records containing `text`
    pub fn exclude<S: Into<String>>(mut self, text: S) -> Self {
        self.partition.filter.exclude = Some(text.into());
        self
    }

    /// Keep records at raw positions `min..=max` (0 = unbounded)
    pub fn range(mut self, min: usize, max: usize) -> Self {
        self.partition.filter.min = min;
        self.partition.filter.max = max;
        self
    }

    /// Capacity of every inter-stage queue
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.engine.queue_capacity = capacity;
        self
    }

    /// Arrivals between reassembler checks
    pub fn heap_delay(mut self, delay: usize) -> Self {
        self.engine.heap_delay = delay;
        self
    }

    /// Bytes per read and reserved carry-over space
    pub fn buffer_sizes(mut self, read_size: usize, reserve_size: usize) -> Self {
        self.engine.read_size = read_size;
        self.engine.reserve_size = reserve_size;
        self
    }

    /// Number of record workers
    pub fn workers(mut self, count: usize) -> Self {
        self.engine.workers = Some(count);
        self
    }

    /// Use the low-latency preset
    pub fn low_latency(mut self) -> Self {
        self.engine = EngineConfig::low_latency();
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.engine, self.partition)
    }
}
