//! Core maintenance engine: prune, deduplicate, enforce capacity

use std::sync::Arc;

use chrono::Utc;
use mnemon_domain::{DiagnosticsBus, MemoryStore};
use serde::{Deserialize, Serialize};

use crate::{MaintenanceConfig, MaintenanceError};

/// Removal counts from one full maintenance cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceOutcome {
    /// Items removed for exceeding the maximum age
    pub pruned: usize,
    /// Older duplicates collapsed into their newest sibling
    pub deduplicated: usize,
    /// Oldest items evicted to get back under capacity
    pub evicted: usize,
}

impl MaintenanceOutcome {
    /// Total items removed across all three policies
    pub fn total_removed(&self) -> usize {
        self.pruned + self.deduplicated + self.evicted
    }
}

/// Policy layer that drives the store's maintenance primitives
///
/// The three policies are independent and individually idempotent; the
/// full cycle composes them in a fixed order. Pruning first shrinks the
/// set deduplication scans, and deduplicating before eviction keeps
/// eviction from spending its budget on rows that were doomed duplicates
/// anyway.
///
/// # Examples
///
/// ```no_run
/// use mnemon_maintenance::{MaintenanceEngine, MaintenanceConfig};
/// use mnemon_store::SqliteMemoryStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteMemoryStore::open("mnemon.db")?;
/// let engine = MaintenanceEngine::new(MaintenanceConfig::default());
///
/// let outcome = engine.run(&store)?;
/// println!("removed {} items", outcome.total_removed());
/// # Ok(())
/// # }
/// ```
pub struct MaintenanceEngine {
    config: MaintenanceConfig,
    bus: Arc<DiagnosticsBus>,
}

impl MaintenanceEngine {
    /// Create an engine with the given configuration
    pub fn new(config: MaintenanceConfig) -> Self {
        Self {
            config,
            bus: Arc::new(DiagnosticsBus::new()),
        }
    }

    /// Create an engine with default configuration
    pub fn default_config() -> Self {
        Self::new(MaintenanceConfig::default())
    }

    /// Replace the diagnostics bus with a shared one
    pub fn with_bus(mut self, bus: Arc<DiagnosticsBus>) -> Self {
        self.bus = bus;
        self
    }

    /// The configuration this engine applies
    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    /// Delete items older than the configured maximum age
    pub fn prune<S: MemoryStore>(&self, store: &S) -> Result<usize, MaintenanceError>
    where
        S::Error: std::fmt::Display,
    {
        let cutoff = Utc::now() - self.config.max_age();
        let pruned = store
            .prune_older_than(cutoff)
            .map_err(|e| MaintenanceError::Store(e.to_string()))?;
        tracing::debug!(pruned, max_age_days = self.config.max_age_days, "prune finished");
        Ok(pruned)
    }

    /// Collapse identical (key, value) pairs down to the newest item each
    pub fn deduplicate<S: MemoryStore>(&self, store: &S) -> Result<usize, MaintenanceError>
    where
        S::Error: std::fmt::Display,
    {
        let deduplicated = store
            .deduplicate()
            .map_err(|e| MaintenanceError::Store(e.to_string()))?;
        tracing::debug!(deduplicated, "deduplication finished");
        Ok(deduplicated)
    }

    /// Evict the oldest items until the configured capacity holds
    pub fn enforce_capacity<S: MemoryStore>(&self, store: &S) -> Result<usize, MaintenanceError>
    where
        S::Error: std::fmt::Display,
    {
        let evicted = store
            .enforce_capacity(self.config.max_items)
            .map_err(|e| MaintenanceError::Store(e.to_string()))?;
        tracing::debug!(evicted, max_items = self.config.max_items, "capacity enforcement finished");
        Ok(evicted)
    }

    /// Run one full cycle: prune, then deduplicate, then enforce capacity
    ///
    /// The three policies run as separate operations, not one transaction;
    /// a write landing between them is simply visible to the next policy.
    pub fn run<S: MemoryStore>(&self, store: &S) -> Result<MaintenanceOutcome, MaintenanceError>
    where
        S::Error: std::fmt::Display,
    {
        let pruned = self.prune(store)?;
        let deduplicated = self.deduplicate(store)?;
        let evicted = self.enforce_capacity(store)?;

        let outcome = MaintenanceOutcome {
            pruned,
            deduplicated,
            evicted,
        };
        self.bus.event(format!(
            "Maintenance cycle: pruned {}, deduplicated {}, evicted {}",
            pruned, deduplicated, evicted
        ));
        Ok(outcome)
    }
}
