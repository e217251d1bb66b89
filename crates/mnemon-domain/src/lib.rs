//! Mnemon Domain Layer
//!
//! This crate contains the core domain model for Mnemon: the memory item
//! value types, the store contract, and the diagnostics bus. It defines the
//! concepts every other layer depends upon and carries no infrastructure.
//!
//! ## Key Concepts
//!
//! - **MemoryItem**: One remembered fact - key, value, timestamp, metadata
//! - **ItemId**: UUIDv7-based identity, chronologically sortable
//! - **MemoryStore**: The storage contract, including the three maintenance
//!   primitives (prune, deduplicate, capacity enforcement)
//! - **DiagnosticsBus**: Fire-and-forget event fan-out for observers
//!
//! ## Architecture
//!
//! - Value types are immutable once created; updates are new items
//! - Infrastructure implementations (SQLite, schedulers) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod item;
pub mod traits;

// Re-exports for convenience
pub use diagnostics::{DiagnosticsBus, DiagnosticsEvent};
pub use item::{ItemId, MemoryItem};
pub use traits::MemoryStore;
