//! Remove command implementation.

use crate::cli::RemoveArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mnemon_domain::{ItemId, MemoryStore};
use mnemon_store::SqliteMemoryStore;

/// Execute the remove command. Takes exactly one of `--id` or `--key`.
pub fn execute_remove(
    args: RemoveArgs,
    store: &SqliteMemoryStore,
    formatter: &Formatter,
) -> Result<()> {
    match (args.id, args.key) {
        (Some(id), None) => {
            let id = ItemId::from_string(&id).map_err(CliError::InvalidInput)?;
            if store.remove(id)? {
                println!("{}", formatter.bulk_result("Removed", 1));
            } else {
                println!("{}", formatter.warning("No item with that id"));
            }
        }
        (None, Some(key)) => {
            if store.remove_by_key(&key)? {
                println!("{}", formatter.bulk_result("Removed", 1));
            } else {
                println!("{}", formatter.warning(&format!("No item found for key '{}'", key)));
            }
        }
        _ => {
            return Err(CliError::InvalidInput(
                "Provide exactly one of --id or --key".to_string(),
            ))
        }
    }

    Ok(())
}
