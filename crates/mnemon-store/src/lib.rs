//! Mnemon Storage Layer
//!
//! Implements the MemoryStore trait over SQLite.
//!
//! # Architecture
//!
//! - One `memory_items` table keyed by UUID text; metadata rides along as a
//!   JSON column
//! - Timestamps persist as RFC 3339 UTC text with fixed microsecond
//!   precision, so SQL string ordering is chronological ordering and the
//!   maintenance primitives are single bulk DELETE statements
//! - The connection sits behind a mutex, so one store instance can be
//!   shared across tasks
//! - Item-stored / item-removed events go out on the diagnostics bus;
//!   `clear` is a bulk operation and stays silent per item
//!
//! # Examples
//!
//! ```no_run
//! use mnemon_domain::MemoryStore;
//! use mnemon_store::SqliteMemoryStore;
//!
//! let store = SqliteMemoryStore::open("mnemon.db").unwrap();
//! let id = store.store("user_name", "Alice", None).unwrap();
//! assert_eq!(store.recall("user_name").unwrap().unwrap().id, id);
//! ```

#![warn(missing_docs)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use mnemon_domain::{DiagnosticsBus, ItemId, MemoryItem, MemoryStore};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

/// Capacity assumed when none is configured
const DEFAULT_CAPACITY: usize = 10_000;

/// Every Nth insert runs the opportunistic capacity check
const CAPACITY_CHECK_INTERVAL: u64 = 100;

/// Utilization (percent of capacity) above which the check enforces
const CAPACITY_CHECK_THRESHOLD_PERCENT: usize = 90;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Metadata could not be encoded or decoded as JSON
    #[error("Metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data encountered in a stored row
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding the connection lock
    #[error("Connection lock poisoned")]
    Poisoned,
}

/// SQLite-based implementation of MemoryStore
///
/// The store owns the backing file exclusively. All mutations are single
/// SQL statements serialized through the connection mutex, so readers
/// observe either the pre- or post-mutation state of any item, never a
/// partial write.
pub struct SqliteMemoryStore {
    conn: Mutex<Connection>,
    bus: Arc<DiagnosticsBus>,
    capacity: usize,
    inserts: AtomicU64,
    path: Option<PathBuf>,
}

impl SqliteMemoryStore {
    /// Open (creating if necessary) the database at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing). The
    /// store starts with a private diagnostics bus and the default
    /// capacity; override both with [`with_bus`](Self::with_bus) and
    /// [`with_capacity`](Self::with_capacity).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mnemon_store::SqliteMemoryStore;
    ///
    /// let store = SqliteMemoryStore::open("mnemon.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let remembered = if path_ref.as_os_str() == ":memory:" {
            None
        } else {
            Some(path_ref.to_path_buf())
        };

        let conn = Connection::open(path_ref)?;
        let store = Self {
            conn: Mutex::new(conn),
            bus: Arc::new(DiagnosticsBus::new()),
            capacity: DEFAULT_CAPACITY,
            inserts: AtomicU64::new(0),
            path: remembered,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Replace the diagnostics bus with a shared one
    pub fn with_bus(mut self, bus: Arc<DiagnosticsBus>) -> Self {
        self.bus = bus;
        self
    }

    /// Set the capacity used by the opportunistic check inside `store`
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The diagnostics bus this store publishes on
    pub fn bus(&self) -> &DiagnosticsBus {
        &self.bus
    }

    /// Path of the backing file; None for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist a fully-formed item, keeping its id and timestamp
    ///
    /// `store` builds a fresh item and delegates here; callers restoring
    /// exported items can use it directly. Publishes the item-stored event
    /// and participates in the opportunistic capacity check like any other
    /// insert.
    pub fn insert(&self, item: &MemoryItem) -> Result<(), StoreError> {
        let metadata_text = match &item.metadata {
            Some(map) => Some(serde_json::to_string(map)?),
            None => None,
        };

        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO memory_items (id, key, value, created_at, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.id.to_string(),
                    &item.key,
                    &item.value,
                    timestamp_to_text(item.created_at),
                    metadata_text,
                ],
            )?;
        }

        self.bus.item_stored(item.clone());
        self.maybe_enforce_capacity()?;
        Ok(())
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn()?.execute_batch(schema)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Every Nth insert, enforce capacity if utilization is past the
    /// threshold. Runs after the insert committed, so the freshly stored
    /// item is part of the count it judges.
    fn maybe_enforce_capacity(&self) -> Result<(), StoreError> {
        let seen = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % CAPACITY_CHECK_INTERVAL != 0 {
            return Ok(());
        }

        let count = self.count()?;
        if count * 100 > self.capacity * CAPACITY_CHECK_THRESHOLD_PERCENT {
            let evicted = self.enforce_capacity(self.capacity)?;
            if evicted > 0 {
                tracing::debug!(
                    evicted,
                    capacity = self.capacity,
                    "opportunistic capacity enforcement"
                );
            }
        }
        Ok(())
    }

    /// Map one row (id, key, value, created_at, metadata) to a MemoryItem
    fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryItem> {
        let id_text: String = row.get(0)?;
        let created_text: String = row.get(3)?;
        let metadata_text: Option<String> = row.get(4)?;

        let id = ItemId::from_string(&id_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, e.into())
        })?;

        let created_at = DateTime::parse_from_rfc3339(&created_text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        let metadata = match metadata_text {
            Some(json) => Some(serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?),
            None => None,
        };

        Ok(MemoryItem {
            id,
            key: row.get(1)?,
            value: row.get(2)?,
            created_at,
            metadata,
        })
    }
}

/// Fixed-width RFC 3339 so string order equals chronological order
fn timestamp_to_text(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MemoryStore for SqliteMemoryStore {
    type Error = StoreError;

    fn store(
        &self,
        key: &str,
        value: &str,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<ItemId, Self::Error> {
        let item = MemoryItem::new(key, value, metadata);
        let id = item.id;
        self.insert(&item)?;
        Ok(id)
    }

    fn recall(&self, key: &str) -> Result<Option<MemoryItem>, Self::Error> {
        let conn = self.conn()?;
        let item = conn
            .query_row(
                "SELECT id, key, value, created_at, metadata FROM memory_items
                 WHERE key = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![key],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn get(&self, id: ItemId) -> Result<Option<MemoryItem>, Self::Error> {
        let conn = self.conn()?;
        let item = conn
            .query_row(
                "SELECT id, key, value, created_at, metadata FROM memory_items WHERE id = ?1",
                params![id.to_string()],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn list_all(&self) -> Result<Vec<MemoryItem>, Self::Error> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, key, value, created_at, metadata FROM memory_items
             ORDER BY created_at, rowid",
        )?;
        let items = stmt
            .query_map([], Self::row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn remove(&self, id: ItemId) -> Result<bool, Self::Error> {
        let item = match self.get(id)? {
            Some(item) => item,
            None => return Ok(false),
        };

        let deleted = {
            let conn = self.conn()?;
            conn.execute(
                "DELETE FROM memory_items WHERE id = ?1",
                params![id.to_string()],
            )?
        };

        if deleted > 0 {
            self.bus.item_removed(item);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn remove_by_key(&self, key: &str) -> Result<bool, Self::Error> {
        let item = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT id, key, value, created_at, metadata FROM memory_items
                 WHERE key = ?1 LIMIT 1",
                params![key],
                Self::row_to_item,
            )
            .optional()?
        };

        match item {
            Some(item) => {
                {
                    let conn = self.conn()?;
                    conn.execute(
                        "DELETE FROM memory_items WHERE id = ?1",
                        params![item.id.to_string()],
                    )?;
                }
                self.bus.item_removed(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self) -> Result<(), Self::Error> {
        let removed = {
            let conn = self.conn()?;
            conn.execute("DELETE FROM memory_items", [])?
        };
        tracing::debug!(removed, "store cleared");
        Ok(())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM memory_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, Self::Error> {
        let removed = {
            let conn = self.conn()?;
            conn.execute(
                "DELETE FROM memory_items WHERE created_at < ?1",
                params![timestamp_to_text(cutoff)],
            )?
        };
        if removed > 0 {
            tracing::debug!(removed, cutoff = %cutoff, "pruned old items");
        }
        Ok(removed)
    }

    fn deduplicate(&self) -> Result<usize, Self::Error> {
        // Within each (key, value) group, every row loses to the greatest
        // (created_at, rowid) and gets deleted; the newest row survives.
        let removed = {
            let conn = self.conn()?;
            conn.execute(
                "DELETE FROM memory_items
                 WHERE EXISTS (
                     SELECT 1 FROM memory_items newer
                      WHERE newer.key = memory_items.key
                        AND newer.value = memory_items.value
                        AND (newer.created_at > memory_items.created_at
                             OR (newer.created_at = memory_items.created_at
                                 AND newer.rowid > memory_items.rowid))
                 )",
                [],
            )?
        };
        if removed > 0 {
            tracing::debug!(removed, "deduplicated items");
        }
        Ok(removed)
    }

    fn enforce_capacity(&self, max_items: usize) -> Result<usize, Self::Error> {
        let count = self.count()?;
        if count <= max_items {
            return Ok(0);
        }
        let excess = count - max_items;

        let removed = {
            let conn = self.conn()?;
            conn.execute(
                "DELETE FROM memory_items WHERE id IN (
                     SELECT id FROM memory_items
                      ORDER BY created_at ASC, rowid ASC
                      LIMIT ?1
                 )",
                params![excess as i64],
            )?
        };
        if removed > 0 {
            tracing::debug!(removed, max_items, "evicted oldest items over capacity");
        }
        Ok(removed)
    }
}
