//! Record partitioning
//!
//! Records start at each occurrence of a literal pattern. Partitioning runs
//! as two sequential stages joined by a queue:
//!
//! - the [`Splitter`] cuts every line block at each pattern match, so each
//!   fragment either starts with the pattern or continues the record opened
//!   in an earlier block;
//! - the [`Merger`] glues fragments back together, starting a new record
//!   whenever a fragment begins with the pattern.
//!
//! Because blocks are line-complete a pattern is never torn across two
//! blocks, and no lookahead is needed to find where a record ends.

use crate::{
    error::Result,
    search::{PatternSearch, SearchOptions, StringSearcher},
    stage::spawn_stage,
    types::LineBlock,
};
use crossbeam_channel::{bounded, Receiver};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Cuts line blocks into fragments at pattern matches
pub struct Splitter {
    searcher: Arc<dyn PatternSearch>,
}

impl Splitter {
    /// Create a splitter using `searcher` to locate the pattern
    pub fn new(searcher: Arc<dyn PatternSearch>) -> Self {
        Self { searcher }
    }

    /// Call `emit` with each non-empty fragment of `block`, in order
    pub fn split<F: FnMut(&[u8])>(&self, block: &[u8], mut emit: F) {
        let mut prev_hit = 0;

        self.searcher.search(block, 0, &mut |pos| {
            if pos != prev_hit {
                emit(&block[prev_hit..pos]);
                prev_hit = pos;
            }
            ControlFlow::Continue(())
        });

        if prev_hit < block.len() {
            emit(&block[prev_hit..]);
        }
    }
}

/// Reassembles fragments into whole records
pub struct Merger {
    searcher: Arc<dyn PatternSearch>,
    buffered: Vec<u8>,
}

impl Merger {
    /// Create a merger recognising record starts with `searcher`
    pub fn new(searcher: Arc<dyn PatternSearch>) -> Self {
        Self {
            searcher,
            buffered: Vec::new(),
        }
    }

    /// Add a fragment, returning the previous record if this one starts a
    /// new record
    pub fn push(&mut self, fragment: &[u8]) -> Option<Vec<u8>> {
        if fragment.is_empty() {
            return None;
        }

        let mut completed = None;
        if self.searcher.matches_at(fragment, 0) && !self.buffered.is_empty() {
            completed = Some(std::mem::take(&mut self.buffered));
        }

        self.buffered.extend_from_slice(fragment);
        completed
    }

    /// The record still being assembled, if any
    pub fn finish(self) -> Option<Vec<u8>> {
        (!self.buffered.is_empty()).then_some(self.buffered)
    }
}

/// Partition `blocks` on `pattern` and call `proc` with every record in
/// stream order.
///
/// Returns once the block stream ends (at its sentinel or when its sender is
/// dropped), or as soon as `proc` breaks. Breaking closes the queues behind
/// it, so the stages feeding this one wind down too. An empty pattern means
/// there is nothing to partition: the blocks are left unread and `proc` is
/// never called.
pub fn partition_text<F>(
    pattern: &str,
    options: SearchOptions,
    queue_capacity: usize,
    blocks: Receiver<LineBlock>,
    proc: F,
) -> Result<()>
where
    F: FnMut(Vec<u8>) -> ControlFlow<()>,
{
    if pattern.is_empty() {
        return Ok(());
    }

    let searcher = StringSearcher::new(pattern, options)?;
    partition_with(Arc::new(searcher), queue_capacity, blocks, proc)
}

/// [`partition_text`] with a caller-supplied search implementation
pub fn partition_with<F>(
    searcher: Arc<dyn PatternSearch>,
    queue_capacity: usize,
    blocks: Receiver<LineBlock>,
    mut proc: F,
) -> Result<()>
where
    F: FnMut(Vec<u8>) -> ControlFlow<()>,
{
    let (fragment_tx, fragment_rx) = bounded::<Vec<u8>>(queue_capacity);
    let (record_tx, record_rx) = bounded::<Vec<u8>>(queue_capacity);

    let splitter = Splitter::new(Arc::clone(&searcher));
    spawn_stage("block-splitter", move || {
        for block in blocks.iter() {
            if block.is_sentinel() {
                break;
            }

            let mut open = true;
            splitter.split(&block, |fragment| {
                if open && fragment_tx.send(fragment.to_vec()).is_err() {
                    open = false;
                }
            });
            if !open {
                break;
            }
        }
    })?;

    let mut merger = Merger::new(searcher);
    spawn_stage("block-merger", move || {
        for fragment in fragment_rx.iter() {
            if let Some(record) = merger.push(&fragment) {
                if record_tx.send(record).is_err() {
                    return;
                }
            }
        }
        if let Some(record) = merger.finish() {
            let _ = record_tx.send(record);
        }
    })?;

    for record in record_rx.iter() {
        if proc(record).is_break() {
            log::debug!("record consumer stopped early, closing partition stages");
            break;
        }
    }

    Ok(())
}
