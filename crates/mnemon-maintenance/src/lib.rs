//! Mnemon Maintenance
//!
//! Policy-driven cleanup for the record store: aging, deduplication, and
//! capacity enforcement, on demand or on a schedule.
//!
//! # Overview
//!
//! The maintenance layer is responsible for:
//! - **Pruning**: Removing items past the configured maximum age
//! - **Deduplication**: Collapsing identical (key, value) pairs to the
//!   newest item
//! - **Capacity enforcement**: Evicting the oldest items once the store
//!   exceeds its configured size
//! - **Scheduling**: Running the full cycle periodically and reporting
//!   each cycle's outcome
//!
//! # Architecture
//!
//! The [`MaintenanceEngine`] is the policy layer: it owns the retention
//! configuration and drives the store's maintenance primitives through the
//! `MemoryStore` trait, so it runs unchanged against any store
//! implementation. The [`MaintenanceScheduler`] wraps the engine in a
//! background loop; a failed cycle is caught at the loop boundary and
//! reported, never fatal.
//!
//! # Usage
//!
//! ## One-time Cycle
//!
//! ```no_run
//! use mnemon_maintenance::{MaintenanceEngine, MaintenanceConfig};
//! use mnemon_store::SqliteMemoryStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteMemoryStore::open("mnemon.db")?;
//! let engine = MaintenanceEngine::new(MaintenanceConfig::default());
//!
//! let outcome = engine.run(&store)?;
//! println!(
//!     "pruned {}, deduplicated {}, evicted {}",
//!     outcome.pruned, outcome.deduplicated, outcome.evicted
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Scheduler
//!
//! ```no_run
//! use mnemon_maintenance::{MaintenanceScheduler, MaintenanceEngine, MaintenanceConfig};
//! use mnemon_store::SqliteMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteMemoryStore::open("mnemon.db")?;
//!     let engine = MaintenanceEngine::new(MaintenanceConfig::default());
//!     let mut scheduler = MaintenanceScheduler::new(engine);
//!
//!     // Run indefinitely (until Ctrl+C)
//!     scheduler.run(&store, |_report| {}).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The maintenance layer can be configured via TOML:
//!
//! ```toml
//! [maintenance]
//! max_age_days = 90
//! max_items = 10000
//! interval_hours = 24
//! ```
//!
//! Presets cover the common cases:
//!
//! ```
//! use mnemon_maintenance::MaintenanceConfig;
//!
//! // Default: 90 days, 10,000 items, daily cycles
//! let config = MaintenanceConfig::default();
//!
//! // Aggressive: shorter retention for constrained deployments
//! let config = MaintenanceConfig::aggressive();
//!
//! // Lenient: longer retention for development
//! let config = MaintenanceConfig::lenient();
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod scheduler;

pub use config::MaintenanceConfig;
pub use engine::{MaintenanceEngine, MaintenanceOutcome};
pub use error::MaintenanceError;
pub use scheduler::{CycleReport, MaintenanceScheduler};
