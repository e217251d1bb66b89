use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mnemon_domain::DiagnosticsBus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MonitorError;
use crate::metrics::MemoryMetrics;

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    /// Informational, no action needed
    Info,
    /// Worth attention soon
    Warning,
    /// Needs action now
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "Info"),
            AlertSeverity::Warning => write!(f, "Warning"),
            AlertSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// The condition an alert reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Item count against the configured capacity limit
    CapacityThresholdExceeded,
    /// Database file size on disk
    DiskUsageThresholdExceeded,
    /// A maintenance cycle failed
    MaintenanceFailure,
    /// Oldest item approaching the configured age limit
    OldItemsAccumulating,
    /// Items are being pruned unusually fast
    HighPruneRate,
    /// Item count growing faster than expected
    UnusualGrowth,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::CapacityThresholdExceeded => write!(f, "CapacityThresholdExceeded"),
            AlertKind::DiskUsageThresholdExceeded => write!(f, "DiskUsageThresholdExceeded"),
            AlertKind::MaintenanceFailure => write!(f, "MaintenanceFailure"),
            AlertKind::OldItemsAccumulating => write!(f, "OldItemsAccumulating"),
            AlertKind::HighPruneRate => write!(f, "HighPruneRate"),
            AlertKind::UnusualGrowth => write!(f, "UnusualGrowth"),
        }
    }
}

/// A raised health alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryAlert {
    /// Unique alert id, used to clear it
    pub id: Uuid,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// The condition being reported
    pub kind: AlertKind,
    /// How urgent it is
    pub severity: AlertSeverity,
    /// Human-readable description
    pub message: String,
    /// Supporting detail for the condition
    pub details: String,
    /// Structured context, for machine consumers
    pub metadata: HashMap<String, String>,
}

impl MemoryAlert {
    /// Create an alert with a fresh id and the current timestamp
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind,
            severity,
            message: message.into(),
            details: details.into(),
            metadata: HashMap::new(),
        }
    }
}

/// Thresholds the alert evaluator reads on every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Capacity percentage that raises a warning. Default: 75
    #[serde(default = "default_capacity_warning_percent")]
    pub capacity_warning_percent: f64,
    /// Capacity percentage that raises a critical alert. Default: 90
    #[serde(default = "default_capacity_critical_percent")]
    pub capacity_critical_percent: f64,
    /// Database size in MB that raises a warning. Default: 100
    #[serde(default = "default_disk_warning_mb")]
    pub disk_warning_mb: f64,
    /// Database size in MB that raises a critical alert. Default: 500
    #[serde(default = "default_disk_critical_mb")]
    pub disk_critical_mb: f64,
    /// Oldest-item age percentage that raises a warning. Default: 80
    #[serde(default = "default_age_warning_percent")]
    pub age_warning_percent: f64,
    /// Oldest-item age percentage that raises a critical alert. Default: 95
    #[serde(default = "default_age_critical_percent")]
    pub age_critical_percent: f64,
    /// Prune rate in items per hour that raises a warning. Default: 100
    #[serde(default = "default_high_prune_rate_per_hour")]
    pub high_prune_rate_per_hour: f64,
}

fn default_capacity_warning_percent() -> f64 {
    75.0
}

fn default_capacity_critical_percent() -> f64 {
    90.0
}

fn default_disk_warning_mb() -> f64 {
    100.0
}

fn default_disk_critical_mb() -> f64 {
    500.0
}

fn default_age_warning_percent() -> f64 {
    80.0
}

fn default_age_critical_percent() -> f64 {
    95.0
}

fn default_high_prune_rate_per_hour() -> f64 {
    100.0
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            capacity_warning_percent: default_capacity_warning_percent(),
            capacity_critical_percent: default_capacity_critical_percent(),
            disk_warning_mb: default_disk_warning_mb(),
            disk_critical_mb: default_disk_critical_mb(),
            age_warning_percent: default_age_warning_percent(),
            age_critical_percent: default_age_critical_percent(),
            high_prune_rate_per_hour: default_high_prune_rate_per_hour(),
        }
    }
}

impl AlertConfig {
    /// Check that every warning threshold sits below its critical counterpart
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.capacity_warning_percent >= self.capacity_critical_percent {
            return Err(MonitorError::Config(
                "capacity_warning_percent must be below capacity_critical_percent".to_string(),
            ));
        }
        if self.disk_warning_mb >= self.disk_critical_mb {
            return Err(MonitorError::Config(
                "disk_warning_mb must be below disk_critical_mb".to_string(),
            ));
        }
        if self.age_warning_percent >= self.age_critical_percent {
            return Err(MonitorError::Config(
                "age_warning_percent must be below age_critical_percent".to_string(),
            ));
        }
        if self.high_prune_rate_per_hour <= 0.0 {
            return Err(MonitorError::Config(
                "high_prune_rate_per_hour must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Evaluates metrics snapshots against thresholds and tracks active alerts.
///
/// An alert stays active until it is cleared explicitly or replaced by one
/// of the same kind at a different severity. While a condition persists at
/// the same severity, repeated evaluations do not raise duplicates.
pub struct AlertManager {
    config: AlertConfig,
    active: Vec<MemoryAlert>,
    bus: Arc<DiagnosticsBus>,
}

impl AlertManager {
    /// Create a manager with the given thresholds and a private bus
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
            bus: Arc::new(DiagnosticsBus::new()),
        }
    }

    /// Publish raise/clear notifications on a shared bus
    pub fn set_bus(&mut self, bus: Arc<DiagnosticsBus>) {
        self.bus = bus;
    }

    /// The thresholds in use
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Currently active alerts, oldest first
    pub fn active_alerts(&self) -> &[MemoryAlert] {
        &self.active
    }

    /// Evaluate a metrics snapshot and return the alerts raised by this
    /// pass. Conditions already active at the same severity are skipped;
    /// a severity change clears the old alert and raises a new one.
    pub fn evaluate(&mut self, metrics: &MemoryMetrics) -> Vec<MemoryAlert> {
        let candidates = self.build_candidates(metrics);
        let mut raised = Vec::new();

        for candidate in candidates {
            let already_active = self
                .active
                .iter()
                .any(|a| a.kind == candidate.kind && a.severity == candidate.severity);
            if already_active {
                continue;
            }

            // Same condition at a different severity: replace it
            let mut idx = 0;
            while idx < self.active.len() {
                if self.active[idx].kind == candidate.kind {
                    let old = self.active.remove(idx);
                    self.notify_cleared(&old);
                } else {
                    idx += 1;
                }
            }

            self.notify_raised(&candidate);
            self.active.push(candidate.clone());
            raised.push(candidate);
        }

        raised
    }

    /// Clear an active alert by id. Returns false if no alert had that id.
    pub fn clear_alert(&mut self, id: Uuid) -> bool {
        match self.active.iter().position(|a| a.id == id) {
            Some(idx) => {
                let old = self.active.remove(idx);
                self.notify_cleared(&old);
                true
            }
            None => false,
        }
    }

    /// Clear every active alert
    pub fn clear_all(&mut self) {
        let drained: Vec<MemoryAlert> = self.active.drain(..).collect();
        for alert in &drained {
            self.notify_cleared(alert);
        }
    }

    fn build_candidates(&self, metrics: &MemoryMetrics) -> Vec<MemoryAlert> {
        let mut candidates = Vec::new();

        let capacity_pct = metrics.capacity_utilization_percent();
        if capacity_pct >= self.config.capacity_critical_percent {
            candidates.push(self.capacity_alert(metrics, AlertSeverity::Critical, capacity_pct));
        } else if capacity_pct >= self.config.capacity_warning_percent {
            candidates.push(self.capacity_alert(metrics, AlertSeverity::Warning, capacity_pct));
        }

        let disk_mb = metrics.database_size_mb();
        if disk_mb >= self.config.disk_critical_mb {
            candidates.push(self.disk_alert(metrics, AlertSeverity::Critical, disk_mb));
        } else if disk_mb >= self.config.disk_warning_mb {
            candidates.push(self.disk_alert(metrics, AlertSeverity::Warning, disk_mb));
        }

        if !metrics.last_maintenance_success {
            let details = metrics
                .last_maintenance_error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            let mut alert = MemoryAlert::new(
                AlertKind::MaintenanceFailure,
                AlertSeverity::Critical,
                "Memory maintenance cycle failed",
                details,
            );
            alert.metadata.insert(
                "failed_cycles".to_string(),
                metrics.failed_maintenance_cycles.to_string(),
            );
            candidates.push(alert);
        }

        let age_pct = metrics.age_utilization_percent();
        if age_pct >= self.config.age_critical_percent {
            candidates.push(self.age_alert(metrics, AlertSeverity::Critical, age_pct));
        } else if age_pct >= self.config.age_warning_percent {
            candidates.push(self.age_alert(metrics, AlertSeverity::Warning, age_pct));
        }

        if metrics.prune_rate_per_hour > self.config.high_prune_rate_per_hour {
            let mut alert = MemoryAlert::new(
                AlertKind::HighPruneRate,
                AlertSeverity::Warning,
                format!("High prune rate detected: {:.1} items/hour", metrics.prune_rate_per_hour),
                "May indicate data retention issues or excessive data creation",
            );
            alert.metadata.insert(
                "prune_rate_per_hour".to_string(),
                format!("{:.1}", metrics.prune_rate_per_hour),
            );
            candidates.push(alert);
        }

        candidates
    }

    fn capacity_alert(
        &self,
        metrics: &MemoryMetrics,
        severity: AlertSeverity,
        pct: f64,
    ) -> MemoryAlert {
        let message = match severity {
            AlertSeverity::Critical => format!("Memory capacity at critical level: {pct:.1}%"),
            _ => format!("Memory capacity approaching limit: {pct:.1}%"),
        };
        let mut alert = MemoryAlert::new(
            AlertKind::CapacityThresholdExceeded,
            severity,
            message,
            format!("Current: {} items, Max: {}", metrics.total_items, metrics.configured_max_items),
        );
        alert
            .metadata
            .insert("utilization_percent".to_string(), format!("{pct:.1}"));
        alert
            .metadata
            .insert("total_items".to_string(), metrics.total_items.to_string());
        alert
            .metadata
            .insert("max_items".to_string(), metrics.configured_max_items.to_string());
        alert
    }

    fn disk_alert(&self, metrics: &MemoryMetrics, severity: AlertSeverity, mb: f64) -> MemoryAlert {
        let message = match severity {
            AlertSeverity::Critical => format!("Disk usage at critical level: {mb:.1} MB"),
            _ => format!("Disk usage high: {mb:.1} MB"),
        };
        let mut alert = MemoryAlert::new(
            AlertKind::DiskUsageThresholdExceeded,
            severity,
            message,
            format!("Database file size: {mb:.1} MB"),
        );
        alert
            .metadata
            .insert("size_bytes".to_string(), metrics.database_size_bytes.to_string());
        alert
    }

    fn age_alert(&self, metrics: &MemoryMetrics, severity: AlertSeverity, pct: f64) -> MemoryAlert {
        let oldest = metrics
            .oldest_item
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        let mut alert = MemoryAlert::new(
            AlertKind::OldItemsAccumulating,
            severity,
            format!("Old items accumulating: {pct:.1}% of maximum age"),
            format!("Oldest item created at {oldest}"),
        );
        alert
            .metadata
            .insert("age_percent".to_string(), format!("{pct:.1}"));
        alert
    }

    fn notify_raised(&self, alert: &MemoryAlert) {
        match alert.severity {
            AlertSeverity::Critical => {
                tracing::error!(kind = %alert.kind, "{}", alert.message)
            }
            AlertSeverity::Warning => {
                tracing::warn!(kind = %alert.kind, "{}", alert.message)
            }
            AlertSeverity::Info => {
                tracing::info!(kind = %alert.kind, "{}", alert.message)
            }
        }
        self.bus
            .event(format!("Alert: [{}] {} - {}", alert.severity, alert.kind, alert.message));
    }

    fn notify_cleared(&self, alert: &MemoryAlert) {
        tracing::info!(kind = %alert.kind, "Alert cleared");
        self.bus.event(format!("Alert cleared: {}", alert.kind));
    }
}
