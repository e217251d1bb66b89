//! Get command implementation.

use crate::cli::GetArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mnemon_domain::{ItemId, MemoryStore};
use mnemon_store::SqliteMemoryStore;

/// Execute the get command.
pub fn execute_get(args: GetArgs, store: &SqliteMemoryStore, formatter: &Formatter) -> Result<()> {
    let id = ItemId::from_string(&args.id).map_err(CliError::InvalidInput)?;

    match store.get(id)? {
        Some(item) => println!("{}", formatter.format_item(&item)?),
        None => println!(
            "{}",
            formatter.warning(&format!("No item with id '{}'", args.id))
        ),
    }

    Ok(())
}
