//! Serve command implementation: the store with its background loops.

use crate::config::MnemonConfig;
use crate::error::Result;
use mnemon_domain::{DiagnosticsBus, DiagnosticsEvent};
use mnemon_maintenance::{MaintenanceEngine, MaintenanceScheduler};
use mnemon_monitor::{HealthMonitor, MonitorConfig};
use mnemon_store::SqliteMemoryStore;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run the store with the maintenance scheduler and health monitor until
/// Ctrl-C.
pub async fn execute_serve(config: &MnemonConfig, db_path: PathBuf) -> Result<()> {
    init_tracing();

    let bus = Arc::new(DiagnosticsBus::new());

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteMemoryStore::open(&db_path)?
        .with_capacity(config.maintenance.max_items)
        .with_bus(Arc::clone(&bus));

    let engine = MaintenanceEngine::new(config.maintenance.clone()).with_bus(Arc::clone(&bus));
    let mut scheduler = MaintenanceScheduler::new(engine);

    let monitor_config = MonitorConfig {
        db_path: Some(db_path.clone()),
        ..config.monitor.clone()
    };
    let monitor = HealthMonitor::new(
        monitor_config,
        config.maintenance.clone(),
        config.alerts.clone(),
    )
    .with_bus(Arc::clone(&bus));

    // Mirror bus traffic into the log so item and alert activity is visible
    let mut events = bus.subscribe();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(DiagnosticsEvent::Error(message)) => tracing::error!("{message}"),
                Ok(event) => tracing::debug!("{event}"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Diagnostics receiver lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tracing::info!(db = %db_path.display(), "Serving memory store; press Ctrl-C to stop");

    let (monitor_result, scheduler_result) = tokio::join!(
        monitor.run(&store),
        scheduler.run(&store, |report| monitor.record_maintenance_cycle(&report)),
    );
    forwarder.abort();
    monitor_result?;
    scheduler_result?;

    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
