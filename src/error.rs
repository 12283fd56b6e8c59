//! Error types for resc-rebalance
//!
//! This module defines the error hierarchy covering:
//! - Configuration and CLI errors
//! - Inventory query errors
//! - Move executor errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the resc-rebalance application
#[derive(Error, Debug)]
pub enum RebalanceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Inventory query errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Move executor errors
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),

    /// I/O errors (log file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interrupted by signal
    #[error("Operation interrupted by signal")]
    Interrupted,
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid process multiplier
    #[error("Invalid process multiplier {value}: must be between 1 and {max}")]
    InvalidMultiplier { value: u32, max: u32 },

    /// Invalid collection prefix
    #[error("Invalid collection '{path}': {reason}")]
    InvalidCollection { path: String, reason: String },

    /// Resource name error
    #[error("Invalid resource name '{name}': {reason}")]
    InvalidResource { name: String, reason: String },

    /// Log file path error
    #[error("Invalid log file path '{path}': {reason}")]
    InvalidLogPath { path: PathBuf, reason: String },
}

/// Inventory query errors
///
/// Any of these is fatal for the whole run: the driver refuses to start
/// moving data against an inventory it could not read completely.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to launch the inventory command
    #[error("Failed to run inventory command '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Inventory command exited with a failure status
    #[error("Inventory command '{program}' failed with status {status}: {stderr}")]
    QueryFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    /// A line of inventory output did not parse
    #[error("Malformed inventory line '{line}': {reason}")]
    MalformedLine { line: String, reason: String },
}

/// Move executor errors
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Failed to spawn the transfer pipeline
    #[error("Failed to spawn mover pipeline '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Could not take a pipe handle from the child
    #[error("Failed to open {stream} pipe to mover pipeline")]
    PipeUnavailable { stream: &'static str },

    /// Feeder or reader thread failed to start
    #[error("Failed to start {name} thread: {reason}")]
    ThreadFailed { name: &'static str, reason: String },
}

/// Result type alias for RebalanceError
pub type Result<T> = std::result::Result<T, RebalanceError>;

/// Result type alias for InventoryError
pub type InventoryResult<T> = std::result::Result<T, InventoryError>;

/// Result type alias for ExecutorError
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let inv_err = InventoryError::SpawnFailed {
            program: "igrid-inventory".into(),
            reason: "No such file or directory".into(),
        };
        let top: RebalanceError = inv_err.into();
        assert!(matches!(top, RebalanceError::Inventory(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidMultiplier { value: 0, max: 16 };
        assert!(err.to_string().contains("between 1 and 16"));
    }
}
