//! ShardStore Error Types

use thiserror::Error;

/// Result type alias for ShardStore operations
pub type Result<T> = std::result::Result<T, Error>;

/// ShardStore error types
///
/// The query path itself never fails: capacity exhaustion, malformed
/// commands, and empty results all degrade to no-ops or fallback text.
/// These variants cover the boundary instead: configuration, a worker
/// whose channel has gone away, and file I/O in the binary.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Fan-out errors
    #[error("Worker {index} is unavailable: {reason}")]
    WorkerUnavailable { index: usize, reason: String },

    #[error("Coordinator already shut down")]
    ShutDown,

    // Protocol errors
    #[error("Protocol serialization error: {0}")]
    ProtocolSerialization(#[from] bincode::Error),

    #[error("Unexpected response from worker {index}: expected {expected}, got {got}")]
    UnexpectedResponse {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error means a worker task is gone for good
    pub fn is_worker_loss(&self) -> bool {
        matches!(self, Error::WorkerUnavailable { .. })
    }
}
