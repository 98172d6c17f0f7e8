//! Core error types for Warden.

use thiserror::Error;

/// Outcome carried back by the worker when it stops for any reason other
/// than finishing its work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// Worker observed the shutdown flag and stopped itself
    #[error("processor shutting down")]
    GracefulShutdown,

    /// Unit of work reported a failure
    #[error("processor failed: {0}")]
    Failed(String),

    /// Unit of work panicked
    #[error("processor panicked")]
    Panicked,

    /// Completion sender dropped without reporting
    #[error("processor disconnected without reporting")]
    Disconnected,
}

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration parsed but holds unusable values
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
