//! Recall command implementation.

use crate::cli::RecallArgs;
use crate::error::Result;
use crate::output::Formatter;
use mnemon_domain::MemoryStore;
use mnemon_store::SqliteMemoryStore;

/// Execute the recall command. Shows the newest item stored under the key.
pub fn execute_recall(
    args: RecallArgs,
    store: &SqliteMemoryStore,
    formatter: &Formatter,
) -> Result<()> {
    match store.recall(&args.key)? {
        Some(item) => println!("{}", formatter.format_item(&item)?),
        None => println!(
            "{}",
            formatter.warning(&format!("No item found for key '{}'", args.key))
        ),
    }

    Ok(())
}
