use thiserror::Error;

/// Errors that can occur while monitoring the memory subsystem
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Underlying storage operation failed while sampling metrics
    #[error("Storage error: {0}")]
    Store(String),

    /// Invalid monitor or alert configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The monitor state lock was poisoned by a panicking thread
    #[error("Monitor state lock poisoned")]
    Poisoned,
}
