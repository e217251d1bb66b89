//! Stats command implementation.

use crate::cli::StatsArgs;
use crate::config::MnemonConfig;
use crate::error::Result;
use crate::output::Formatter;
use mnemon_monitor::{HealthMonitor, MonitorConfig};
use mnemon_store::SqliteMemoryStore;
use std::path::Path;

/// Execute the stats command. Runs a one-shot health check and prints the
/// resulting metrics snapshot.
pub fn execute_stats(
    args: StatsArgs,
    store: &SqliteMemoryStore,
    config: &MnemonConfig,
    db_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let monitor_config = MonitorConfig {
        db_path: Some(db_path.to_path_buf()),
        ..config.monitor.clone()
    };
    let monitor = HealthMonitor::new(
        monitor_config,
        config.maintenance.clone(),
        config.alerts.clone(),
    );

    let metrics = monitor.check_now(store)?;
    println!("{}", formatter.format_metrics(&metrics, args.detailed)?);

    for alert in monitor.active_alerts()? {
        let line = format!("[{}] {}", alert.severity, alert.message);
        println!("{}", formatter.warning(&line));
    }

    Ok(())
}
