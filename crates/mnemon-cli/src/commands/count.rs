//! Count command implementation.

use crate::error::Result;
use crate::output::Formatter;
use mnemon_domain::MemoryStore;
use mnemon_store::SqliteMemoryStore;

/// Execute the count command.
pub fn execute_count(store: &SqliteMemoryStore, formatter: &Formatter) -> Result<()> {
    let count = store.count()?;
    println!("{}", formatter.format_count(count)?);
    Ok(())
}
