use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mnemon_domain::{DiagnosticsBus, MemoryStore};
use mnemon_maintenance::{CycleReport, MaintenanceConfig};
use serde::{Deserialize, Serialize};
use tokio::time::interval;
use uuid::Uuid;

use crate::alert::{AlertConfig, AlertManager, MemoryAlert};
use crate::error::MonitorError;
use crate::metrics::MemoryMetrics;

fn default_check_interval_secs() -> u64 {
    300
}

fn default_detailed_report_every() -> u64 {
    12
}

/// Settings for the background health monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between health checks. Default: 300
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Every Nth check also logs the full metrics report. Default: 12,
    /// which is hourly at the default interval.
    #[serde(default = "default_detailed_report_every")]
    pub detailed_report_every: u64,

    /// Database file whose size feeds the disk-usage metric
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            detailed_report_every: default_detailed_report_every(),
            db_path: None,
        }
    }
}

impl MonitorConfig {
    /// The check interval as a [`Duration`]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Check that the settings describe a runnable monitor
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.check_interval_secs == 0 {
            return Err(MonitorError::Config(
                "check_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.detailed_report_every == 0 {
            return Err(MonitorError::Config(
                "detailed_report_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

struct MonitorState {
    metrics: MemoryMetrics,
    alerts: AlertManager,
    started_at: DateTime<Utc>,
    consecutive_failures: u32,
}

/// Samples store metrics on a schedule and raises alerts on thresholds.
///
/// The monitor is shared behind an [`Arc`]: the background loop runs
/// [`run`](Self::run) while the maintenance scheduler's report callback
/// calls [`record_maintenance_cycle`](Self::record_maintenance_cycle)
/// from another task. All state lives behind one internal lock.
pub struct HealthMonitor {
    config: MonitorConfig,
    maintenance: MaintenanceConfig,
    state: Mutex<MonitorState>,
}

impl HealthMonitor {
    /// Create a monitor with the given schedule, maintenance limits, and
    /// alert thresholds
    pub fn new(
        config: MonitorConfig,
        maintenance: MaintenanceConfig,
        alert_config: AlertConfig,
    ) -> Self {
        Self {
            config,
            maintenance,
            state: Mutex::new(MonitorState {
                metrics: MemoryMetrics::default(),
                alerts: AlertManager::new(alert_config),
                started_at: Utc::now(),
                consecutive_failures: 0,
            }),
        }
    }

    /// Publish alert notifications on a shared bus
    pub fn with_bus(self, bus: Arc<DiagnosticsBus>) -> Self {
        // Construction time, nothing else can hold the lock yet
        if let Ok(mut state) = self.state.lock() {
            state.alerts.set_bus(bus);
        }
        self
    }

    /// The monitor settings in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Sample the store, refresh metrics, and evaluate alert thresholds.
    /// Returns the refreshed snapshot.
    pub fn check_now<S>(&self, store: &S) -> Result<MemoryMetrics, MonitorError>
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
    {
        let mut guard = self.state()?;
        let state = &mut *guard;
        let uptime_hours = (Utc::now() - state.started_at).num_seconds() as f64 / 3600.0;

        match collect_metrics(
            &mut state.metrics,
            store,
            self.config.db_path.as_deref(),
            uptime_hours,
            &self.maintenance,
        ) {
            Ok(()) => {
                state.consecutive_failures = 0;
                let raised = state.alerts.evaluate(&state.metrics);
                let active = state.alerts.active_alerts().len();
                if state.metrics.is_healthy() {
                    tracing::info!(
                        items = state.metrics.total_items,
                        capacity_percent = state.metrics.capacity_utilization_percent(),
                        "Health check: HEALTHY"
                    );
                } else {
                    tracing::warn!(
                        items = state.metrics.total_items,
                        active_alerts = active,
                        newly_raised = raised.len(),
                        "Health check: ATTENTION NEEDED"
                    );
                }
                Ok(state.metrics.clone())
            }
            Err(e) => {
                state.consecutive_failures += 1;
                state.metrics.last_maintenance_success = false;
                state.metrics.last_maintenance_error = Some(e.to_string());
                state.metrics.failed_maintenance_cycles += 1;
                tracing::error!(
                    consecutive_failures = state.consecutive_failures,
                    "Health check failed: {e}"
                );
                Err(e)
            }
        }
    }

    /// Fold a maintenance cycle report into the metrics. Called by the
    /// scheduler after every cycle, successful or not.
    pub fn record_maintenance_cycle(&self, report: &CycleReport) {
        match self.state.lock() {
            Ok(mut state) => {
                state.metrics.record_cycle(report);
                if report.success {
                    tracing::info!(
                        pruned = report.pruned,
                        deduplicated = report.deduplicated,
                        evicted = report.evicted,
                        "Maintenance cycle recorded"
                    );
                } else {
                    tracing::warn!(
                        error = report.error.as_deref().unwrap_or("unknown"),
                        "Failed maintenance cycle recorded"
                    );
                }
            }
            Err(_) => tracing::error!("Monitor state lock poisoned, dropping cycle report"),
        }
    }

    /// The most recent metrics snapshot
    pub fn current_metrics(&self) -> Result<MemoryMetrics, MonitorError> {
        Ok(self.state()?.metrics.clone())
    }

    /// Currently active alerts
    pub fn active_alerts(&self) -> Result<Vec<MemoryAlert>, MonitorError> {
        Ok(self.state()?.alerts.active_alerts().to_vec())
    }

    /// Clear one active alert by id
    pub fn clear_alert(&self, id: Uuid) -> Result<bool, MonitorError> {
        Ok(self.state()?.alerts.clear_alert(id))
    }

    /// Clear every active alert
    pub fn clear_all_alerts(&self) -> Result<(), MonitorError> {
        self.state()?.alerts.clear_all();
        Ok(())
    }

    /// Number of health checks that have failed in a row
    pub fn consecutive_failures(&self) -> Result<u32, MonitorError> {
        Ok(self.state()?.consecutive_failures)
    }

    /// Run the monitoring loop until shutdown is signalled.
    ///
    /// The first check runs immediately, then one per configured interval.
    /// A failed check is logged and the loop keeps going.
    pub async fn run<S>(&self, store: &S) -> Result<(), MonitorError>
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
    {
        tracing::info!(
            interval_secs = self.config.check_interval_secs,
            "Health monitor started"
        );

        let mut ticker = interval(self.config.check_interval());
        let mut checks: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    checks += 1;
                    self.run_check(store, checks);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping health monitor");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run a fixed number of checks and return. Used in tests and for
    /// one-shot diagnostics.
    pub async fn run_cycles<S>(&self, store: &S, cycles: usize) -> Result<(), MonitorError>
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
    {
        let mut ticker = interval(self.config.check_interval());

        for check in 1..=cycles {
            ticker.tick().await;
            self.run_check(store, check as u64);
        }

        Ok(())
    }

    fn run_check<S>(&self, store: &S, check_number: u64)
    where
        S: MemoryStore,
        S::Error: std::fmt::Display,
    {
        // check_now already logs failures
        if let Ok(metrics) = self.check_now(store) {
            if check_number % self.config.detailed_report_every == 0 {
                tracing::info!("{}", metrics.detailed_report());
            }
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MonitorState>, MonitorError> {
        self.state.lock().map_err(|_| MonitorError::Poisoned)
    }
}

fn collect_metrics<S>(
    metrics: &mut MemoryMetrics,
    store: &S,
    db_path: Option<&Path>,
    uptime_hours: f64,
    maintenance: &MaintenanceConfig,
) -> Result<(), MonitorError>
where
    S: MemoryStore,
    S::Error: std::fmt::Display,
{
    let items = store
        .list_all()
        .map_err(|e| MonitorError::Store(e.to_string()))?;

    metrics.total_items = items.len();
    metrics.oldest_item = items.iter().map(|i| i.created_at).min();
    metrics.newest_item = items.iter().map(|i| i.created_at).max();
    metrics.average_item_age_hours = if items.is_empty() {
        0.0
    } else {
        let now = Utc::now();
        items
            .iter()
            .map(|i| (now - i.created_at).num_seconds() as f64 / 3600.0)
            .sum::<f64>()
            / items.len() as f64
    };

    metrics.database_size_bytes = match db_path {
        Some(path) => std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        None => 0,
    };

    metrics.configured_max_items = maintenance.max_items;
    metrics.configured_max_age_hours = maintenance.max_age_hours();

    if uptime_hours > 0.0 {
        metrics.prune_rate_per_hour = metrics.total_items_pruned as f64 / uptime_hours;
        metrics.deduplication_rate_per_hour = metrics.total_items_deduplicated as f64 / uptime_hours;
        metrics.storage_rate_per_hour = metrics.total_items as f64 / uptime_hours;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertKind, AlertSeverity};
    use chrono::Duration as ChronoDuration;
    use mnemon_domain::{ItemId, MemoryItem};
    use std::collections::HashMap;

    struct MockStore {
        items: Mutex<Vec<MemoryItem>>,
        fail_with: Option<String>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                items: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                items: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        fn seed(&self, items: Vec<MemoryItem>) {
            *self.items.lock().unwrap() = items;
        }

        fn check(&self) -> Result<(), String> {
            match &self.fail_with {
                Some(message) => Err(message.clone()),
                None => Ok(()),
            }
        }
    }

    impl MemoryStore for MockStore {
        type Error = String;

        fn store(
            &self,
            key: &str,
            value: &str,
            metadata: Option<HashMap<String, String>>,
        ) -> Result<ItemId, Self::Error> {
            self.check()?;
            let item = MemoryItem::new(key, value, metadata);
            let id = item.id;
            self.items.lock().unwrap().push(item);
            Ok(id)
        }

        fn recall(&self, key: &str) -> Result<Option<MemoryItem>, Self::Error> {
            self.check()?;
            let items = self.items.lock().unwrap();
            Ok(items
                .iter()
                .filter(|i| i.key == key)
                .max_by_key(|i| i.created_at)
                .cloned())
        }

        fn get(&self, id: ItemId) -> Result<Option<MemoryItem>, Self::Error> {
            self.check()?;
            let items = self.items.lock().unwrap();
            Ok(items.iter().find(|i| i.id == id).cloned())
        }

        fn list_all(&self) -> Result<Vec<MemoryItem>, Self::Error> {
            self.check()?;
            let mut items = self.items.lock().unwrap().clone();
            items.sort_by_key(|i| i.created_at);
            Ok(items)
        }

        fn remove(&self, id: ItemId) -> Result<bool, Self::Error> {
            self.check()?;
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|i| i.id != id);
            Ok(items.len() < before)
        }

        fn remove_by_key(&self, key: &str) -> Result<bool, Self::Error> {
            self.check()?;
            let mut items = self.items.lock().unwrap();
            match items.iter().position(|i| i.key == key) {
                Some(idx) => {
                    items.remove(idx);
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn clear(&self) -> Result<(), Self::Error> {
            self.check()?;
            self.items.lock().unwrap().clear();
            Ok(())
        }

        fn count(&self) -> Result<usize, Self::Error> {
            self.check()?;
            Ok(self.items.lock().unwrap().len())
        }

        fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, Self::Error> {
            self.check()?;
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|i| i.created_at >= cutoff);
            Ok(before - items.len())
        }

        fn deduplicate(&self) -> Result<usize, Self::Error> {
            self.check()?;
            Ok(0)
        }

        fn enforce_capacity(&self, max_items: usize) -> Result<usize, Self::Error> {
            self.check()?;
            let mut items = self.items.lock().unwrap();
            if items.len() <= max_items {
                return Ok(0);
            }
            items.sort_by_key(|i| i.created_at);
            let excess = items.len() - max_items;
            items.drain(..excess);
            Ok(excess)
        }
    }

    fn aged_item(key: &str, value: &str, age_hours: i64) -> MemoryItem {
        MemoryItem {
            id: ItemId::new(),
            key: key.to_string(),
            value: value.to_string(),
            created_at: Utc::now() - ChronoDuration::hours(age_hours),
            metadata: None,
        }
    }

    fn monitor_for(max_items: usize) -> HealthMonitor {
        let maintenance = MaintenanceConfig {
            max_items,
            ..Default::default()
        };
        HealthMonitor::new(MonitorConfig::default(), maintenance, AlertConfig::default())
    }

    #[test]
    fn test_check_now_samples_store() {
        let store = MockStore::new();
        store.seed(vec![aged_item("a", "1", 5), aged_item("b", "2", 1)]);
        let monitor = monitor_for(100);

        let metrics = monitor.check_now(&store).unwrap();

        assert_eq!(metrics.total_items, 2);
        assert!(metrics.oldest_item.is_some());
        assert!(metrics.newest_item.is_some());
        assert!(metrics.oldest_item <= metrics.newest_item);
        assert!(
            (2.0..4.5).contains(&metrics.average_item_age_hours),
            "expected ~3h, got {}",
            metrics.average_item_age_hours
        );
        assert_eq!(metrics.configured_max_items, 100);
        assert!(monitor.active_alerts().unwrap().is_empty());
    }

    #[test]
    fn test_check_now_raises_capacity_alert() {
        let store = MockStore::new();
        store.seed((0..9).map(|n| aged_item(&format!("k{n}"), "v", 1)).collect());
        let monitor = monitor_for(10);

        monitor.check_now(&store).unwrap();
        let alerts = monitor.active_alerts().unwrap();

        assert_eq!(alerts.len(), 1, "expected exactly one alert: {alerts:?}");
        assert_eq!(alerts[0].kind, AlertKind::CapacityThresholdExceeded);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_failed_check_tracks_consecutive_failures() {
        let store = MockStore::failing("database is locked");
        let monitor = monitor_for(100);

        assert!(monitor.check_now(&store).is_err());
        assert!(monitor.check_now(&store).is_err());

        assert_eq!(monitor.consecutive_failures().unwrap(), 2);
        let metrics = monitor.current_metrics().unwrap();
        assert!(!metrics.last_maintenance_success);
        assert_eq!(metrics.failed_maintenance_cycles, 2);
        assert!(metrics
            .last_maintenance_error
            .as_deref()
            .unwrap()
            .contains("database is locked"));
    }

    #[test]
    fn test_successful_check_resets_failure_streak() {
        let monitor = monitor_for(100);
        let failing = MockStore::failing("database is locked");
        let healthy = MockStore::new();

        let _ = monitor.check_now(&failing);
        assert_eq!(monitor.consecutive_failures().unwrap(), 1);

        monitor.check_now(&healthy).unwrap();
        assert_eq!(monitor.consecutive_failures().unwrap(), 0);
    }

    #[test]
    fn test_recorded_failure_surfaces_as_alert() {
        let store = MockStore::new();
        let monitor = monitor_for(100);

        monitor.record_maintenance_cycle(&CycleReport::failed("disk full"));
        monitor.check_now(&store).unwrap();

        let alerts = monitor.active_alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MaintenanceFailure);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts[0].details.contains("disk full"), "details: {}", alerts[0].details);
    }

    #[test]
    fn test_record_maintenance_cycle_updates_metrics() {
        let monitor = monitor_for(100);

        monitor.record_maintenance_cycle(&CycleReport::succeeded(
            mnemon_maintenance::MaintenanceOutcome {
                pruned: 5,
                deduplicated: 3,
                evicted: 2,
            },
        ));
        monitor.record_maintenance_cycle(&CycleReport::failed("disk full"));

        let metrics = monitor.current_metrics().unwrap();
        assert_eq!(metrics.total_items_pruned, 5);
        assert_eq!(metrics.total_items_deduplicated, 3);
        assert_eq!(metrics.total_items_evicted, 2);
        assert_eq!(metrics.failed_maintenance_cycles, 1);
        assert!(!metrics.last_maintenance_success);
    }

    #[test]
    fn test_clear_alert_through_monitor() {
        let store = MockStore::new();
        store.seed((0..9).map(|n| aged_item(&format!("k{n}"), "v", 1)).collect());
        let monitor = monitor_for(10);

        monitor.check_now(&store).unwrap();
        let alerts = monitor.active_alerts().unwrap();
        assert_eq!(alerts.len(), 1);

        assert!(monitor.clear_alert(alerts[0].id).unwrap());
        assert!(monitor.active_alerts().unwrap().is_empty());

        monitor.clear_all_alerts().unwrap();
        assert!(monitor.active_alerts().unwrap().is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(MonitorConfig::default().validate().is_ok());

        let bad = MonitorConfig {
            check_interval_secs: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_input() {
        let config: MonitorConfig = serde_json::from_str(r#"{"check_interval_secs": 60}"#).unwrap();

        assert_eq!(config.check_interval_secs, 60);
        assert_eq!(config.detailed_report_every, 12);
        assert!(config.db_path.is_none());
    }

    #[tokio::test]
    async fn test_run_cycles_single_check() {
        let store = MockStore::new();
        store.seed(vec![aged_item("a", "1", 1)]);
        let monitor = monitor_for(100);

        monitor.run_cycles(&store, 1).await.unwrap();

        let metrics = monitor.current_metrics().unwrap();
        assert_eq!(metrics.total_items, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_follows_schedule() {
        let store = MockStore::new();
        store.seed(vec![aged_item("a", "1", 1), aged_item("b", "2", 1)]);
        let config = MonitorConfig {
            check_interval_secs: 300,
            detailed_report_every: 2,
            db_path: None,
        };
        let monitor = HealthMonitor::new(
            config,
            MaintenanceConfig::default(),
            AlertConfig::default(),
        );

        monitor.run_cycles(&store, 3).await.unwrap();

        let metrics = monitor.current_metrics().unwrap();
        assert_eq!(metrics.total_items, 2);
        assert_eq!(monitor.consecutive_failures().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_survives_failing_store() {
        let store = MockStore::failing("database is locked");
        let monitor = monitor_for(100);

        monitor.run_cycles(&store, 2).await.unwrap();

        assert_eq!(monitor.consecutive_failures().unwrap(), 2);
    }
}
