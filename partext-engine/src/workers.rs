//! Parallel record workers
//!
//! Fans indexed records out to a fixed number of workers and collects what
//! they return. Results come back in completion order; pass them through
//! the unshuffler to restore index order.

use crate::{error::Result, types::IndexedRecord};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;

/// Start `count` workers that apply `transform` to every record of `input`.
///
/// Each record yields exactly one result carrying the same index, so an
/// empty transform result still reaches the reassembler.
pub fn spawn_workers<F>(
    input: Receiver<IndexedRecord>,
    count: usize,
    queue_capacity: usize,
    transform: F,
) -> Result<Receiver<IndexedRecord>>
where
    F: Fn(&IndexedRecord) -> Vec<u8> + Send + Sync + 'static,
{
    let (tx, rx) = bounded(queue_capacity);
    launch(count.max(1), input, tx, Arc::new(transform))?;
    Ok(rx)
}

fn run_worker<F>(input: &Receiver<IndexedRecord>, output: &Sender<IndexedRecord>, transform: &F)
where
    F: Fn(&IndexedRecord) -> Vec<u8>,
{
    for record in input.iter() {
        let result = record.with_text(transform(&record));
        if output.send(result).is_err() {
            break;
        }
    }
}

#[cfg(feature = "parallel")]
fn launch<F>(
    count: usize,
    input: Receiver<IndexedRecord>,
    output: Sender<IndexedRecord>,
    transform: Arc<F>,
) -> Result<()>
where
    F: Fn(&IndexedRecord) -> Vec<u8> + Send + Sync + 'static,
{
    use crate::error::EngineError;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(count)
        .thread_name(|i| format!("record-worker-{i}"))
        .build()
        .map_err(|e| EngineError::StageSpawn {
            stage: "record-worker".to_string(),
            reason: e.to_string(),
        })?;

    // spawned jobs keep the pool's threads alive after the handle is dropped
    for _ in 0..count {
        let input = input.clone();
        let output = output.clone();
        let transform = Arc::clone(&transform);
        pool.spawn(move || run_worker(&input, &output, transform.as_ref()));
    }

    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn launch<F>(
    count: usize,
    input: Receiver<IndexedRecord>,
    output: Sender<IndexedRecord>,
    transform: Arc<F>,
) -> Result<()>
where
    F: Fn(&IndexedRecord) -> Vec<u8> + Send + Sync + 'static,
{
    for worker in 0..count {
        let input = input.clone();
        let output = output.clone();
        let transform = Arc::clone(&transform);
        crate::stage::spawn_stage(&format!("record-worker-{worker}"), move || {
            run_worker(&input, &output, transform.as_ref())
        })?;
    }

    Ok(())
}
