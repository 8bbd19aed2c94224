//! Record filtering and dense indexing

use crate::{
    config::{EngineConfig, PartitionConfig, RecordFilter},
    error::{ErrorSink, Result},
    partition::partition_with,
    search::{PatternSearch, SearchOptions, StringSearcher},
    stage::spawn_stage,
    types::{IndexedRecord, LineBlock},
};
use crossbeam_channel::{bounded, Receiver};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Applies a [`RecordFilter`] and numbers the records that pass.
///
/// Tests run in order: require, exclude, then the min/max range on the
/// record's raw position. Raw positions count every record seen; indices
/// count only survivors, so they stay dense.
#[derive(Debug)]
pub struct IndexedFilter {
    require: Option<StringSearcher>,
    exclude: Option<StringSearcher>,
    min: usize,
    max: usize,
    position: usize,
    index: usize,
}

impl IndexedFilter {
    /// Build the filter. Empty require/exclude strings are ignored.
    pub fn new(filter: &RecordFilter, options: SearchOptions) -> Result<Self> {
        // filters are plain containment tests regardless of word matching
        let options = SearchOptions {
            whole_word: false,
            ..options
        };
        let searcher = |text: &Option<String>| -> Result<Option<StringSearcher>> {
            match text.as_deref() {
                Some(text) if !text.is_empty() => Ok(Some(StringSearcher::new(text, options)?)),
                _ => Ok(None),
            }
        };

        Ok(Self {
            require: searcher(&filter.require)?,
            exclude: searcher(&filter.exclude)?,
            min: filter.min,
            max: filter.max,
            position: 0,
            index: 0,
        })
    }

    /// Count `text` and return it with its index if it passes every test
    pub fn accept(&mut self, text: Vec<u8>) -> Option<IndexedRecord> {
        self.position += 1;

        if let Some(require) = &self.require {
            if !require.contains(&text) {
                return None;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.contains(&text) {
                return None;
            }
        }
        if self.min > 0 && self.position < self.min {
            return None;
        }
        if self.max > 0 && self.position > self.max {
            return None;
        }

        self.index += 1;
        Some(IndexedRecord::new(self.index, text))
    }

    /// Records seen so far, including rejected ones
    pub fn position(&self) -> usize {
        self.position
    }

    /// Records accepted so far
    pub fn accepted(&self) -> usize {
        self.index
    }
}

/// Start a stage that partitions `blocks` into records, filters them and
/// sends the survivors downstream with dense indices.
///
/// With an empty pattern the returned queue is already closed and empty.
pub fn create_text_producer(
    partition: &PartitionConfig,
    config: &EngineConfig,
    blocks: Receiver<LineBlock>,
    errors: ErrorSink,
) -> Result<Receiver<IndexedRecord>> {
    let (tx, rx) = bounded(config.queue_capacity);

    if partition.pattern.is_empty() {
        log::debug!("no record pattern given, producer has nothing to do");
        return Ok(rx);
    }

    let searcher: Arc<dyn PatternSearch> =
        Arc::new(StringSearcher::new(partition.pattern.as_str(), partition.options)?);
    if partition.filter.is_active() {
        log::debug!("record filter: {:?}", partition.filter);
    }
    let mut filter = IndexedFilter::new(&partition.filter, partition.options)?;
    let queue_capacity = config.queue_capacity;

    spawn_stage("text-producer", move || {
        let outcome = partition_with(searcher, queue_capacity, blocks, |record| {
            let Some(indexed) = filter.accept(record) else {
                return ControlFlow::Continue(());
            };
            if tx.send(indexed).is_err() {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        if let Err(err) = outcome {
            errors.report(err);
        }
        log::debug!(
            "text-producer kept {} of {} records",
            filter.accepted(),
            filter.position()
        );
    })?;

    Ok(rx)
}
