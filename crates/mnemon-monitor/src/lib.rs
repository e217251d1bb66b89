//! Health monitoring and alerting for the mnemon memory subsystem.
//!
//! # Overview
//!
//! The monitor samples a [`MemoryStore`](mnemon_domain::MemoryStore) on a
//! fixed schedule, refreshes a [`MemoryMetrics`] snapshot, and evaluates it
//! against [`AlertConfig`] thresholds. Crossing a threshold raises a
//! [`MemoryAlert`]; an alert stays active until cleared or replaced by one
//! of the same kind at a different severity.
//!
//! Five conditions are checked on every pass:
//!
//! - item count against the configured capacity limit (warning/critical)
//! - database file size on disk (warning/critical)
//! - failed maintenance cycles (always critical)
//! - oldest-item age against the configured age limit (warning/critical)
//! - prune throughput (warning)
//!
//! # Usage
//!
//! ```no_run
//! use mnemon_maintenance::MaintenanceConfig;
//! use mnemon_monitor::{AlertConfig, HealthMonitor, MonitorConfig};
//! use mnemon_store::SqliteMemoryStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteMemoryStore::open(":memory:")?;
//! let monitor = HealthMonitor::new(
//!     MonitorConfig::default(),
//!     MaintenanceConfig::default(),
//!     AlertConfig::default(),
//! );
//!
//! // One-shot check
//! let metrics = monitor.check_now(&store)?;
//! println!("{}", metrics.summary());
//!
//! // Or run the background loop until shutdown
//! monitor.run(&store).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The maintenance scheduler feeds cycle reports into the monitor through
//! [`HealthMonitor::record_maintenance_cycle`], so failed cycles surface as
//! critical alerts on the next evaluation.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod alert;
mod error;
mod metrics;
mod monitor;

pub use alert::{AlertConfig, AlertKind, AlertManager, AlertSeverity, MemoryAlert};
pub use error::MonitorError;
pub use metrics::MemoryMetrics;
pub use monitor::{HealthMonitor, MonitorConfig};
