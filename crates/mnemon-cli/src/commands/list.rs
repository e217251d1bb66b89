//! List command implementation.

use crate::error::Result;
use crate::output::Formatter;
use mnemon_domain::MemoryStore;
use mnemon_store::SqliteMemoryStore;

/// Execute the list command.
pub fn execute_list(store: &SqliteMemoryStore, formatter: &Formatter) -> Result<()> {
    let items = store.list_all()?;
    println!("{}", formatter.format_items(&items)?);
    Ok(())
}
