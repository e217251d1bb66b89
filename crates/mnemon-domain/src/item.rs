//! Memory item module - the fundamental unit of Mnemon's record store

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a memory item based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability for temporal queries
/// - 128-bit uniqueness
/// - RFC 9562-standard format with broad ecosystem support
/// - No coordination required for generation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ItemId(uuid::Uuid);

impl ItemId {
    /// Generate a new UUIDv7-based ItemId
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemon_domain::ItemId;
    ///
    /// let id = ItemId::new();
    /// assert_eq!(id.to_string().len(), 36);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Wrap an existing UUID
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ItemId from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use mnemon_domain::ItemId;
    ///
    /// let id = ItemId::new();
    /// let parsed = ItemId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid item id: {}", e))
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A memory item - one remembered fact
///
/// Items are immutable once created; updates create new items under the
/// same key, and `recall` resolves to the newest one. Older same-key items
/// remain until maintenance removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Unique identifier, assigned at creation
    pub id: ItemId,

    /// Non-unique lookup label; many items may share a key
    pub key: String,

    /// The remembered payload, opaque to the store
    pub value: String,

    /// Creation timestamp (UTC); the sole ordering key for age and eviction
    pub created_at: DateTime<Utc>,

    /// Optional string-to-string annotations attached at creation
    pub metadata: Option<HashMap<String, String>>,
}

impl MemoryItem {
    /// Create a new item with a fresh id and the current UTC timestamp
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        metadata: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            key: key.into(),
            value: value.into(),
            created_at: Utc::now(),
            metadata,
        }
    }
}
