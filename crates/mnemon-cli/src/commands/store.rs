//! Store command implementation.

use crate::cli::StoreArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mnemon_domain::MemoryStore;
use mnemon_store::SqliteMemoryStore;
use std::collections::HashMap;

/// Execute the store command.
pub fn execute_store(
    args: StoreArgs,
    store: &SqliteMemoryStore,
    formatter: &Formatter,
) -> Result<()> {
    let metadata = parse_metadata(&args.metadata)?;
    let id = store.store(&args.key, &args.value, metadata)?;

    println!("{}", formatter.item_stored(&id));

    Ok(())
}

/// Parse repeated `key=value` flags into a metadata map.
fn parse_metadata(entries: &[String]) -> Result<Option<HashMap<String, String>>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut metadata = HashMap::new();
    for entry in entries {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Invalid metadata '{}'. Expected 'key=value'",
                entry
            ))
        })?;
        metadata.insert(key.to_string(), value.to_string());
    }

    Ok(Some(metadata))
}
