//! Command implementations.

use crate::config::MnemonConfig;
use crate::error::Result;
use mnemon_store::SqliteMemoryStore;
use std::fs;
use std::path::Path;

pub mod clear;
pub mod count;
pub mod get;
pub mod list;
pub mod maintenance;
pub mod recall;
pub mod remove;
pub mod serve;
pub mod stats;
pub mod store;

pub use self::clear::execute_clear;
pub use self::count::execute_count;
pub use self::get::execute_get;
pub use self::list::execute_list;
pub use self::maintenance::{execute_deduplicate, execute_maintenance, execute_prune};
pub use self::recall::execute_recall;
pub use self::remove::execute_remove;
pub use self::serve::execute_serve;
pub use self::stats::execute_stats;
pub use self::store::execute_store;

/// Open the store at the given path, creating parent directories as needed.
pub fn open_store(db_path: &Path, config: &MnemonConfig) -> Result<SqliteMemoryStore> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteMemoryStore::open(db_path)?.with_capacity(config.maintenance.max_items);
    Ok(store)
}
