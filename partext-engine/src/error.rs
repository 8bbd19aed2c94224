//! Engine error types and the stage error side channel

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// I/O error reported by the byte source
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// A search pattern that cannot be used
    #[error("invalid search pattern: {reason}")]
    InvalidPattern {
        /// The reason why the pattern was rejected
        reason: String,
    },

    /// A pipeline stage could not be started
    #[error("failed to start {stage} stage: {reason}")]
    StageSpawn {
        /// Name of the stage that failed to start
        stage: String,
        /// The underlying failure
        reason: String,
    },
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Side channel for errors that terminate a stage without failing its caller.
///
/// Stages run detached, so a read failure deep in the segmenter cannot be
/// returned to whoever started the pipeline. It is logged and sent here
/// instead, and the stage closes its output as if the stream had ended.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    tx: Sender<EngineError>,
}

impl ErrorSink {
    /// Create a sink together with the receiver that observes reported errors
    pub fn new() -> (Self, Receiver<EngineError>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    /// Create a sink whose errors are only logged
    pub fn discard() -> Self {
        Self::new().0
    }

    /// Log an error and forward it to the receiver, if one is still listening
    pub fn report(&self, err: EngineError) {
        log::error!("{err}");
        let _ = self.tx.send(err);
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::discard()
    }
}
