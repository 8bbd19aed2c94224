//! Detached pipeline stage threads

use crate::error::{EngineError, Result};
use std::thread;

/// Run `body` on its own named thread.
///
/// Stages are never joined; each one ends when its input closes and signals
/// completion downstream by dropping its sender.
pub(crate) fn spawn_stage<F>(name: &str, body: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    let stage = name.to_string();
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            log::debug!("{stage} started");
            body();
            log::debug!("{stage} finished");
        })
        .map(drop)
        .map_err(|e| EngineError::StageSpawn {
            stage: name.to_string(),
            reason: e.to_string(),
        })
}
