//! Clear command implementation.

use crate::cli::ClearArgs;
use crate::error::Result;
use crate::output::Formatter;
use mnemon_domain::MemoryStore;
use mnemon_store::SqliteMemoryStore;
use std::io::{self, BufRead, Write};

/// Execute the clear command. Prompts for confirmation unless `--yes`.
pub fn execute_clear(
    args: ClearArgs,
    store: &SqliteMemoryStore,
    formatter: &Formatter,
) -> Result<()> {
    let count = store.count()?;
    if count == 0 {
        println!("{}", formatter.info("Store is already empty"));
        return Ok(());
    }

    if !args.yes {
        print!("About to delete {} item(s). Continue? [y/N] ", count);
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    store.clear()?;
    println!("{}", formatter.bulk_result("Deleted", count));

    Ok(())
}
