//! Maintenance command implementations: prune, deduplicate, and the full
//! cycle.

use crate::config::MnemonConfig;
use crate::error::Result;
use crate::output::Formatter;
use mnemon_maintenance::MaintenanceEngine;
use mnemon_store::SqliteMemoryStore;

/// Execute the prune command.
pub fn execute_prune(
    store: &SqliteMemoryStore,
    config: &MnemonConfig,
    formatter: &Formatter,
) -> Result<()> {
    let engine = MaintenanceEngine::new(config.maintenance.clone());
    let removed = engine.prune(store)?;

    println!("{}", formatter.bulk_result("Pruned", removed));

    Ok(())
}

/// Execute the deduplicate command.
pub fn execute_deduplicate(
    store: &SqliteMemoryStore,
    config: &MnemonConfig,
    formatter: &Formatter,
) -> Result<()> {
    let engine = MaintenanceEngine::new(config.maintenance.clone());
    let removed = engine.deduplicate(store)?;

    println!("{}", formatter.bulk_result("Deduplicated", removed));

    Ok(())
}

/// Execute a full maintenance cycle.
pub fn execute_maintenance(
    store: &SqliteMemoryStore,
    config: &MnemonConfig,
    formatter: &Formatter,
) -> Result<()> {
    let engine = MaintenanceEngine::new(config.maintenance.clone());
    let outcome = engine.run(store)?;

    println!("{}", formatter.format_outcome(&outcome)?);

    Ok(())
}
