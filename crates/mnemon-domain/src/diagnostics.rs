//! Diagnostics bus - process-wide, fire-and-forget event fan-out
//!
//! One bus instance is constructed at startup and handed to every component
//! that publishes. Publishing never blocks and never fails the publisher:
//! `broadcast::send` returns an error only when no receiver exists, which
//! is ignored. Subscribers attach and detach at any time by holding or
//! dropping a receiver, and a slow or panicking subscriber cannot reach
//! back into the publishing call.

use std::fmt;

use tokio::sync::broadcast;

use crate::MemoryItem;

/// Default buffer depth for the underlying broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// An event published on the diagnostics bus
#[derive(Debug, Clone)]
pub enum DiagnosticsEvent {
    /// An item was persisted
    ItemStored(MemoryItem),
    /// An item was removed individually (bulk operations do not emit this)
    ItemRemoved(MemoryItem),
    /// A general informational message
    Message(String),
    /// An error report from a component
    Error(String),
}

impl fmt::Display for DiagnosticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemStored(item) => write!(f, "stored {} (key: {})", item.id, item.key),
            Self::ItemRemoved(item) => write!(f, "removed {} (key: {})", item.id, item.key),
            Self::Message(msg) => write!(f, "{}", msg),
            Self::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Fire-and-forget event hooks shared by the whole process
///
/// # Examples
///
/// ```
/// use mnemon_domain::{DiagnosticsBus, DiagnosticsEvent};
///
/// let bus = DiagnosticsBus::new();
/// let mut rx = bus.subscribe();
/// bus.event("maintenance cycle completed");
///
/// match rx.try_recv() {
///     Ok(DiagnosticsEvent::Message(msg)) => assert!(msg.contains("completed")),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticsBus {
    sender: broadcast::Sender<DiagnosticsEvent>,
}

impl DiagnosticsBus {
    /// Create a bus with the default buffer depth
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit buffer depth
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Attach a new subscriber; dropping the receiver detaches it
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticsEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an item-stored event
    pub fn item_stored(&self, item: MemoryItem) {
        self.publish(DiagnosticsEvent::ItemStored(item));
    }

    /// Publish an item-removed event
    pub fn item_removed(&self, item: MemoryItem) {
        self.publish(DiagnosticsEvent::ItemRemoved(item));
    }

    /// Publish a general informational message
    pub fn event(&self, message: impl Into<String>) {
        self.publish(DiagnosticsEvent::Message(message.into()));
    }

    /// Publish an error report
    pub fn error(&self, message: impl Into<String>) {
        self.publish(DiagnosticsEvent::Error(message.into()));
    }

    fn publish(&self, event: DiagnosticsEvent) {
        // Err means no receivers are attached, which is fine
        let _ = self.sender.send(event);
    }
}

impl Default for DiagnosticsBus {
    fn default() -> Self {
        Self::new()
    }
}
