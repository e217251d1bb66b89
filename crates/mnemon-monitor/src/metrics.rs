use chrono::{DateTime, Utc};
use mnemon_maintenance::CycleReport;
use serde::{Deserialize, Serialize};

/// Snapshot of the memory subsystem's state, refreshed on every health check.
///
/// Live fields (item counts, timestamps, database size) are overwritten each
/// sampling pass. Maintenance fields persist between passes and are updated
/// only when a cycle report arrives via [`record_cycle`](Self::record_cycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Number of items currently stored
    pub total_items: usize,
    /// Creation time of the oldest stored item, if any
    pub oldest_item: Option<DateTime<Utc>>,
    /// Creation time of the newest stored item, if any
    pub newest_item: Option<DateTime<Utc>>,
    /// Mean age of stored items in hours
    pub average_item_age_hours: f64,
    /// Size of the backing database file in bytes (0 for in-memory stores)
    pub database_size_bytes: u64,

    /// Items pruned by the most recent maintenance cycle
    pub items_pruned_last_cycle: usize,
    /// Items deduplicated by the most recent maintenance cycle
    pub items_deduplicated_last_cycle: usize,
    /// Items evicted for capacity by the most recent maintenance cycle
    pub items_evicted_last_cycle: usize,
    /// When the most recent maintenance cycle ran
    pub last_maintenance_time: Option<DateTime<Utc>>,
    /// Whether the most recent maintenance cycle succeeded
    pub last_maintenance_success: bool,
    /// Error from the most recent maintenance cycle, if it failed
    pub last_maintenance_error: Option<String>,

    /// Items pruned across all cycles since the monitor started
    pub total_items_pruned: u64,
    /// Items deduplicated across all cycles since the monitor started
    pub total_items_deduplicated: u64,
    /// Items evicted across all cycles since the monitor started
    pub total_items_evicted: u64,
    /// Number of maintenance cycles recorded since the monitor started
    pub total_maintenance_cycles: u64,
    /// Number of maintenance cycles that failed since the monitor started
    pub failed_maintenance_cycles: u64,

    /// Prune throughput against monitor uptime, items per hour
    pub prune_rate_per_hour: f64,
    /// Deduplication throughput against monitor uptime, items per hour
    pub deduplication_rate_per_hour: f64,
    /// Current item count against monitor uptime, items per hour
    pub storage_rate_per_hour: f64,

    /// Capacity limit the maintenance policy enforces
    pub configured_max_items: usize,
    /// Age limit the maintenance policy enforces, in hours
    pub configured_max_age_hours: f64,
}

impl Default for MemoryMetrics {
    fn default() -> Self {
        Self {
            total_items: 0,
            oldest_item: None,
            newest_item: None,
            average_item_age_hours: 0.0,
            database_size_bytes: 0,
            items_pruned_last_cycle: 0,
            items_deduplicated_last_cycle: 0,
            items_evicted_last_cycle: 0,
            last_maintenance_time: None,
            // No cycle has run yet, which is not a failure
            last_maintenance_success: true,
            last_maintenance_error: None,
            total_items_pruned: 0,
            total_items_deduplicated: 0,
            total_items_evicted: 0,
            total_maintenance_cycles: 0,
            failed_maintenance_cycles: 0,
            prune_rate_per_hour: 0.0,
            deduplication_rate_per_hour: 0.0,
            storage_rate_per_hour: 0.0,
            configured_max_items: 0,
            configured_max_age_hours: 0.0,
        }
    }
}

impl MemoryMetrics {
    /// Percentage of the configured item capacity currently in use.
    ///
    /// Returns 0.0 when no capacity limit is configured.
    pub fn capacity_utilization_percent(&self) -> f64 {
        if self.configured_max_items == 0 {
            return 0.0;
        }
        self.total_items as f64 * 100.0 / self.configured_max_items as f64
    }

    /// Age of the oldest item as a percentage of the configured maximum age.
    ///
    /// Returns 0.0 when the store is empty or no age limit is configured.
    pub fn age_utilization_percent(&self) -> f64 {
        let oldest = match self.oldest_item {
            Some(t) => t,
            None => return 0.0,
        };
        if self.configured_max_age_hours <= 0.0 {
            return 0.0;
        }
        let age_hours = (Utc::now() - oldest).num_seconds() as f64 / 3600.0;
        age_hours * 100.0 / self.configured_max_age_hours
    }

    /// True when capacity and age are both under 90% and the last
    /// maintenance cycle succeeded.
    pub fn is_healthy(&self) -> bool {
        self.capacity_utilization_percent() < 90.0
            && self.age_utilization_percent() < 90.0
            && self.last_maintenance_success
    }

    /// Database size in megabytes
    pub fn database_size_mb(&self) -> f64 {
        self.database_size_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Fold a completed maintenance cycle into the snapshot: last-cycle
    /// fields are replaced, cumulative totals accumulate.
    pub fn record_cycle(&mut self, report: &CycleReport) {
        self.items_pruned_last_cycle = report.pruned;
        self.items_deduplicated_last_cycle = report.deduplicated;
        self.items_evicted_last_cycle = report.evicted;
        self.last_maintenance_time = Some(Utc::now());
        self.last_maintenance_success = report.success;
        self.last_maintenance_error = report.error.clone();
        self.total_items_pruned += report.pruned as u64;
        self.total_items_deduplicated += report.deduplicated as u64;
        self.total_items_evicted += report.evicted as u64;
        self.total_maintenance_cycles += 1;
        if !report.success {
            self.failed_maintenance_cycles += 1;
        }
    }

    /// One-line status suitable for periodic logging
    pub fn summary(&self) -> String {
        let last_maintenance = match self.last_maintenance_time {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => "never".to_string(),
        };
        format!(
            "Items: {}/{} ({:.1}%), DB: {:.1} MB, Healthy: {}, Last maintenance: {}",
            self.total_items,
            self.configured_max_items,
            self.capacity_utilization_percent(),
            self.database_size_mb(),
            self.is_healthy(),
            last_maintenance
        )
    }

    /// Multi-line report covering current state, the last maintenance
    /// cycle, cumulative statistics, throughput rates, and overall health.
    pub fn detailed_report(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Memory Metrics Report ===".to_string());
        lines.push(String::new());

        lines.push("Current State:".to_string());
        lines.push(format!(
            "  Items: {} / {} ({:.1}% of capacity)",
            self.total_items,
            self.configured_max_items,
            self.capacity_utilization_percent()
        ));
        lines.push(format!("  Database size: {:.1} MB", self.database_size_mb()));
        match self.oldest_item {
            Some(t) => lines.push(format!(
                "  Oldest item: {} ({:.1}% of maximum age)",
                t.format("%Y-%m-%d %H:%M:%S UTC"),
                self.age_utilization_percent()
            )),
            None => lines.push("  Oldest item: none".to_string()),
        }
        match self.newest_item {
            Some(t) => lines.push(format!("  Newest item: {}", t.format("%Y-%m-%d %H:%M:%S UTC"))),
            None => lines.push("  Newest item: none".to_string()),
        }
        lines.push(format!("  Average item age: {:.1} hours", self.average_item_age_hours));
        lines.push(String::new());

        lines.push("Last Maintenance Cycle:".to_string());
        match self.last_maintenance_time {
            Some(t) => lines.push(format!("  Time: {}", t.format("%Y-%m-%d %H:%M:%S UTC"))),
            None => lines.push("  Time: never".to_string()),
        }
        lines.push(format!("  Success: {}", self.last_maintenance_success));
        lines.push(format!(
            "  Pruned: {}, Deduplicated: {}, Evicted: {}",
            self.items_pruned_last_cycle,
            self.items_deduplicated_last_cycle,
            self.items_evicted_last_cycle
        ));
        if let Some(error) = &self.last_maintenance_error {
            lines.push(format!("  Error: {error}"));
        }
        lines.push(String::new());

        lines.push("Cumulative Statistics:".to_string());
        lines.push(format!("  Total cycles: {}", self.total_maintenance_cycles));
        lines.push(format!("  Total pruned: {}", self.total_items_pruned));
        lines.push(format!("  Total deduplicated: {}", self.total_items_deduplicated));
        lines.push(format!("  Total evicted: {}", self.total_items_evicted));
        lines.push(format!("  Failed cycles: {}", self.failed_maintenance_cycles));
        lines.push(String::new());

        lines.push("Rates (per hour):".to_string());
        lines.push(format!("  Prune: {:.2}", self.prune_rate_per_hour));
        lines.push(format!("  Deduplication: {:.2}", self.deduplication_rate_per_hour));
        lines.push(format!("  Storage growth: {:.2}", self.storage_rate_per_hour));
        lines.push(String::new());

        let status = if self.is_healthy() { "HEALTHY" } else { "ATTENTION NEEDED" };
        lines.push(format!("Health Status: {status}"));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_default_metrics_are_healthy() {
        let metrics = MemoryMetrics::default();

        assert!(metrics.is_healthy(), "empty metrics should be healthy");
        assert_eq!(metrics.capacity_utilization_percent(), 0.0);
        assert_eq!(metrics.age_utilization_percent(), 0.0);
        assert!(metrics.last_maintenance_success);
    }

    #[test]
    fn test_capacity_utilization() {
        let metrics = MemoryMetrics {
            total_items: 9,
            configured_max_items: 10,
            ..Default::default()
        };

        assert!((metrics.capacity_utilization_percent() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capacity_utilization_without_limit_is_zero() {
        let metrics = MemoryMetrics {
            total_items: 1_000_000,
            configured_max_items: 0,
            ..Default::default()
        };

        assert_eq!(metrics.capacity_utilization_percent(), 0.0);
    }

    #[test]
    fn test_age_utilization() {
        let metrics = MemoryMetrics {
            oldest_item: Some(Utc::now() - Duration::hours(50)),
            configured_max_age_hours: 100.0,
            ..Default::default()
        };

        let pct = metrics.age_utilization_percent();
        assert!((45.0..55.0).contains(&pct), "expected ~50%, got {pct}");
    }

    #[test]
    fn test_unhealthy_at_capacity() {
        let metrics = MemoryMetrics {
            total_items: 95,
            configured_max_items: 100,
            ..Default::default()
        };

        assert!(!metrics.is_healthy());
    }

    #[test]
    fn test_unhealthy_after_failed_maintenance() {
        let mut metrics = MemoryMetrics::default();
        metrics.record_cycle(&CycleReport::failed("disk full"));

        assert!(!metrics.is_healthy());
        assert_eq!(metrics.last_maintenance_error.as_deref(), Some("disk full"));
        assert_eq!(metrics.failed_maintenance_cycles, 1);
    }

    #[test]
    fn test_record_cycle_accumulates_totals() {
        let mut metrics = MemoryMetrics::default();

        let mut first = CycleReport::succeeded(mnemon_maintenance::MaintenanceOutcome {
            pruned: 3,
            deduplicated: 2,
            evicted: 1,
        });
        metrics.record_cycle(&first);
        first.pruned = 4;
        metrics.record_cycle(&first);

        assert_eq!(metrics.items_pruned_last_cycle, 4, "last cycle fields are replaced");
        assert_eq!(metrics.total_items_pruned, 7, "cumulative totals accumulate");
        assert_eq!(metrics.total_items_deduplicated, 4);
        assert_eq!(metrics.total_items_evicted, 2);
        assert_eq!(metrics.total_maintenance_cycles, 2);
        assert_eq!(metrics.failed_maintenance_cycles, 0);
        assert!(metrics.last_maintenance_time.is_some());
    }

    #[test]
    fn test_record_cycle_failure_then_success_clears_error() {
        let mut metrics = MemoryMetrics::default();

        metrics.record_cycle(&CycleReport::failed("disk full"));
        metrics.record_cycle(&CycleReport::succeeded(Default::default()));

        assert!(metrics.last_maintenance_success);
        assert!(metrics.last_maintenance_error.is_none());
        assert_eq!(metrics.failed_maintenance_cycles, 1, "failure count is cumulative");
    }

    #[test]
    fn test_summary_mentions_items_and_health() {
        let metrics = MemoryMetrics {
            total_items: 42,
            configured_max_items: 1000,
            ..Default::default()
        };

        let summary = metrics.summary();
        assert!(summary.contains("42/1000"), "summary was: {summary}");
        assert!(summary.contains("Healthy: true"), "summary was: {summary}");
        assert!(summary.contains("Last maintenance: never"), "summary was: {summary}");
    }

    #[test]
    fn test_detailed_report_sections() {
        let mut metrics = MemoryMetrics {
            total_items: 5,
            configured_max_items: 100,
            configured_max_age_hours: 720.0,
            oldest_item: Some(Utc::now() - Duration::hours(2)),
            newest_item: Some(Utc::now()),
            ..Default::default()
        };
        metrics.record_cycle(&CycleReport::succeeded(mnemon_maintenance::MaintenanceOutcome {
            pruned: 1,
            deduplicated: 0,
            evicted: 0,
        }));

        let report = metrics.detailed_report();
        assert!(report.starts_with("=== Memory Metrics Report ==="));
        assert!(report.contains("Current State:"));
        assert!(report.contains("Last Maintenance Cycle:"));
        assert!(report.contains("Cumulative Statistics:"));
        assert!(report.contains("Rates (per hour):"));
        assert!(report.contains("Health Status: HEALTHY"));
        assert!(report.contains("Total cycles: 1"));
        assert!(report.contains("Pruned: 1, Deduplicated: 0, Evicted: 0"));
    }

    #[test]
    fn test_detailed_report_shows_failure() {
        let mut metrics = MemoryMetrics::default();
        metrics.record_cycle(&CycleReport::failed("disk full"));

        let report = metrics.detailed_report();
        assert!(report.contains("Success: false"));
        assert!(report.contains("Error: disk full"));
        assert!(report.contains("Health Status: ATTENTION NEEDED"));
    }

    #[test]
    fn test_metrics_serialize_roundtrip() {
        let metrics = MemoryMetrics {
            total_items: 7,
            configured_max_items: 50,
            database_size_bytes: 4096,
            ..Default::default()
        };

        let json = serde_json::to_string(&metrics).unwrap();
        let back: MemoryMetrics = serde_json::from_str(&json).unwrap();

        assert_eq!(back.total_items, 7);
        assert_eq!(back.configured_max_items, 50);
        assert_eq!(back.database_size_bytes, 4096);
    }
}
