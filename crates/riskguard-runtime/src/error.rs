//! Runtime error types

use riskguard_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Velocity counter store could not be reached
    #[error("Counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Fraud pattern definition could not be loaded
    #[error("Pattern configuration error: {0}")]
    PatternConfig(String),

    /// Domain rule violated
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
