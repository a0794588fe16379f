use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::broadcast;

use super::domain::{ConversationId, MessageId};
use crate::social::profiles::ProfileId;

/// Event emitted after a message is persisted, consumed by conversation-list
/// views to recompute unread counts and ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEvent {
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: ProfileId,
}

/// Trait describing the outbound notification hook the messaging service
/// publishes into.
pub trait MessagePublisher: Send + Sync {
    fn publish(&self, event: MessageEvent) -> Result<(), PublishError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event channel unavailable: {0}")]
    Channel(String),
}

/// Broadcast-backed fan-out standing in for the external realtime channel.
/// Subscribers receive every event published after they subscribe; dropping
/// the receiver unsubscribes, after which no further work happens for that
/// listener.
pub struct MessageBus {
    tx: broadcast::Sender<MessageEvent>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.tx.subscribe()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MessagePublisher for MessageBus {
    fn publish(&self, event: MessageEvent) -> Result<(), PublishError> {
        // A send with no live receivers is fine; delivery is best-effort
        // and the store remains the source of truth.
        let _ = self.tx.send(event);
        Ok(())
    }
}

/// Tracks which message ids a listener has already handled so duplicate
/// delivery of the same event stays idempotent.
#[derive(Debug, Default)]
pub struct ConversationListener {
    seen: HashSet<MessageId>,
}

impl ConversationListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the event is fresh and the caller should refresh
    /// the affected conversation; `false` for a duplicate.
    pub fn observe(&mut self, event: &MessageEvent) -> bool {
        self.seen.insert(event.message_id.clone())
    }
}
