//! Order-restoring reassembly
//!
//! Workers finish records in any order. The [`Unshuffler`] holds finished
//! records in a min-heap keyed by index and releases them once every earlier
//! index has been released.

use crate::{config::EngineConfig, error::Result, stage::spawn_stage, types::IndexedRecord};
use crossbeam_channel::{bounded, Receiver};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Heap entry; ties on index resolve by arrival
#[derive(Debug)]
struct Pending {
    index: usize,
    arrival: u64,
    text: Vec<u8>,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.arrival).cmp(&(other.index, other.arrival))
    }
}

/// Releases out-of-order records in index order.
///
/// Checking the heap after every arrival is wasted work when workers run far
/// apart, so the head is only examined once `heap_delay` further records have
/// arrived. A delay of 0 checks on every arrival.
///
/// An index at or below the next expected one is released as soon as it is
/// seen; only an exact match advances the expected index. When the input
/// ends, everything left is released in ascending index order, gaps or not.
#[derive(Debug)]
pub struct Unshuffler {
    heap: BinaryHeap<Reverse<Pending>>,
    next: usize,
    delay: usize,
    heap_delay: usize,
    arrivals: u64,
}

impl Unshuffler {
    /// Create a reassembler expecting index 1 first
    pub fn new(heap_delay: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next: 1,
            delay: 0,
            heap_delay,
            arrivals: 0,
        }
    }

    /// Accept a record and release whatever is now in order
    pub fn push<F: FnMut(Vec<u8>)>(&mut self, record: IndexedRecord, mut emit: F) {
        self.arrivals += 1;
        self.heap.push(Reverse(Pending {
            index: record.index,
            arrival: self.arrivals,
            text: record.text,
        }));

        if self.delay < self.heap_delay {
            self.delay += 1;
            return;
        }
        self.delay = 0;

        while self
            .heap
            .peek()
            .is_some_and(|Reverse(head)| head.index <= self.next)
        {
            let Some(Reverse(head)) = self.heap.pop() else {
                break;
            };
            if head.index == self.next {
                self.next += 1;
            }
            emit(head.text);
        }
    }

    /// Release everything still held, lowest index first
    pub fn finish<F: FnMut(Vec<u8>)>(mut self, mut emit: F) {
        while let Some(Reverse(head)) = self.heap.pop() {
            emit(head.text);
        }
    }

    /// Index the reassembler is waiting for
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Records held back
    pub fn pending(&self) -> usize {
        self.heap.len()
    }
}

/// Start a stage that restores index order on `input` and sends the record
/// texts downstream.
///
/// The stage stops early once the returned receiver is dropped, which in turn
/// closes its input and lets the workers feeding it finish.
pub fn create_text_unshuffler(
    input: Receiver<IndexedRecord>,
    config: &EngineConfig,
) -> Result<Receiver<Vec<u8>>> {
    let (tx, rx) = bounded(config.queue_capacity);
    let mut unshuffler = Unshuffler::new(config.heap_delay);

    spawn_stage("text-unshuffler", move || {
        let mut open = true;
        for record in input.iter() {
            unshuffler.push(record, |text| {
                open = open && tx.send(text).is_ok();
            });
            if !open {
                return;
            }
        }

        if unshuffler.pending() > 0 {
            log::debug!(
                "input closed with {} records held, waiting on index {}",
                unshuffler.pending(),
                unshuffler.next_index()
            );
        }
        unshuffler.finish(|text| {
            let _ = tx.send(text);
        });
    })?;

    Ok(rx)
}
