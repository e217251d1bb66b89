//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Infrastructure implementations live in other crates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{ItemId, MemoryItem};

/// Trait for storing and retrieving memory items
///
/// Implemented by the infrastructure layer (mnemon-store). The maintenance
/// primitives are part of the contract so the policy layer and the store's
/// own opportunistic capacity check can share one implementation, and so
/// engine and monitor logic can run against mock stores in tests.
///
/// Methods take `&self`; implementations are expected to serialize internal
/// mutation themselves so a single instance can be shared across tasks.
pub trait MemoryStore {
    /// Error type for store operations
    type Error;

    /// Insert a new item under `key`, assigning a fresh id and the current
    /// UTC timestamp. Returns the assigned id.
    fn store(
        &self,
        key: &str,
        value: &str,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<ItemId, Self::Error>;

    /// The item with the given key and the greatest `created_at`, if any
    fn recall(&self, key: &str) -> Result<Option<MemoryItem>, Self::Error>;

    /// Look up an item by id
    fn get(&self, id: ItemId) -> Result<Option<MemoryItem>, Self::Error>;

    /// All items currently held
    fn list_all(&self) -> Result<Vec<MemoryItem>, Self::Error>;

    /// Remove the item with the given id; false if absent
    fn remove(&self, id: ItemId) -> Result<bool, Self::Error>;

    /// Remove one arbitrarily-chosen item with the given key; false if none
    fn remove_by_key(&self, key: &str) -> Result<bool, Self::Error>;

    /// Remove every item as a single bulk operation
    fn clear(&self) -> Result<(), Self::Error>;

    /// Number of items currently held
    fn count(&self) -> Result<usize, Self::Error>;

    /// Delete every item created strictly before `cutoff`; returns the
    /// number removed
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, Self::Error>;

    /// Collapse items sharing an identical (key, value) pair down to the
    /// newest one per pair; returns the number removed
    fn deduplicate(&self) -> Result<usize, Self::Error>;

    /// Delete the oldest items until at most `max_items` remain; returns
    /// the number removed
    fn enforce_capacity(&self, max_items: usize) -> Result<usize, Self::Error>;
}
