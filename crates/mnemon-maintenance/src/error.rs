//! Error types for maintenance operations

use thiserror::Error;

/// Errors that can occur during maintenance operations
#[derive(Error, Debug)]
pub enum MaintenanceError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
