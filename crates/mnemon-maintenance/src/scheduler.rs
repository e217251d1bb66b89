//! Background scheduler for periodic maintenance cycles

use mnemon_domain::MemoryStore;
use serde::{Deserialize, Serialize};
use tokio::time::{interval, Duration};

use crate::{MaintenanceEngine, MaintenanceError, MaintenanceOutcome};

/// What one scheduled cycle did, including whether it failed
///
/// Reports flow to whoever observes maintenance (in practice the health
/// monitor) through the callback handed to [`MaintenanceScheduler::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Items removed for exceeding the maximum age
    pub pruned: usize,
    /// Older duplicates collapsed into their newest sibling
    pub deduplicated: usize,
    /// Oldest items evicted to get back under capacity
    pub evicted: usize,
    /// Whether the cycle ran to completion
    pub success: bool,
    /// The failure message when it did not
    pub error: Option<String>,
}

impl CycleReport {
    /// Report for a cycle that ran to completion
    pub fn succeeded(outcome: MaintenanceOutcome) -> Self {
        Self {
            pruned: outcome.pruned,
            deduplicated: outcome.deduplicated,
            evicted: outcome.evicted,
            success: true,
            error: None,
        }
    }

    /// Report for a cycle that failed partway
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            pruned: 0,
            deduplicated: 0,
            evicted: 0,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Background worker that runs the maintenance engine on a schedule
///
/// One failed cycle never stops the loop: the failure is logged, wrapped
/// in a [`CycleReport`], and handed to the report callback so alerting can
/// pick it up.
///
/// # Examples
///
/// ```no_run
/// use mnemon_maintenance::{MaintenanceScheduler, MaintenanceEngine, MaintenanceConfig};
/// use mnemon_store::SqliteMemoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteMemoryStore::open("mnemon.db")?;
///     let engine = MaintenanceEngine::new(MaintenanceConfig::default());
///     let mut scheduler = MaintenanceScheduler::new(engine);
///
///     // Run indefinitely (until Ctrl+C)
///     scheduler.run(&store, |report| {
///         println!("cycle success: {}", report.success);
///     }).await?;
///     Ok(())
/// }
/// ```
pub struct MaintenanceScheduler {
    engine: MaintenanceEngine,
    interval: Duration,
}

impl MaintenanceScheduler {
    /// Create a scheduler around the given engine, using the engine's
    /// configured cycle interval
    pub fn new(engine: MaintenanceEngine) -> Self {
        let interval = engine.config().cycle_interval();
        Self { engine, interval }
    }

    /// The engine this scheduler drives
    pub fn engine(&self) -> &MaintenanceEngine {
        &self.engine
    }

    /// Run the scheduler indefinitely
    ///
    /// Runs one cycle per interval tick until a shutdown signal (Ctrl+C)
    /// is received. The shutdown wait is part of the select, so the signal
    /// interrupts the sleep promptly instead of running one more cycle.
    pub async fn run<S, F>(&mut self, store: &S, mut on_report: F) -> Result<(), MaintenanceError>
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
        F: FnMut(CycleReport),
    {
        let mut ticker = interval(self.interval);

        tracing::info!("Maintenance scheduler started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_once(store);
                    on_report(report);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping maintenance scheduler");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run a fixed number of cycles (useful for testing)
    pub async fn run_cycles<S, F>(
        &mut self,
        store: &S,
        cycles: usize,
        mut on_report: F,
    ) -> Result<(), MaintenanceError>
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
        F: FnMut(CycleReport),
    {
        let mut ticker = interval(self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting maintenance cycle {}/{}", cycle + 1, cycles);
            let report = self.run_once(store);
            on_report(report);
        }

        Ok(())
    }

    /// One cycle: count, run the engine, count again, report
    ///
    /// Failures are converted into a failed report here; they do not
    /// propagate.
    fn run_once<S>(&self, store: &S) -> CycleReport
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
    {
        let before = match store.count() {
            Ok(n) => n,
            Err(e) => {
                tracing::error!("Maintenance cycle failed: {}", e);
                return CycleReport::failed(e.to_string());
            }
        };

        match self.engine.run(store) {
            Ok(outcome) => {
                let after = store
                    .count()
                    .unwrap_or_else(|_| before.saturating_sub(outcome.total_removed()));
                tracing::info!(
                    before,
                    after,
                    pruned = outcome.pruned,
                    deduplicated = outcome.deduplicated,
                    evicted = outcome.evicted,
                    "maintenance cycle completed"
                );
                CycleReport::succeeded(outcome)
            }
            Err(e) => {
                tracing::error!("Maintenance cycle failed: {}", e);
                CycleReport::failed(e.to_string())
            }
        }
    }
}
