//! Direct and group conversations, message delivery, and unread accounting.

pub mod domain;
pub mod events;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{Conversation, ConversationId, ConversationKind, DirectPair, Message, MessageId};
pub use events::{ConversationListener, MessageBus, MessageEvent, MessagePublisher, PublishError};
pub use repository::ConversationRepository;
pub use router::conversation_router;
pub use service::{MessagingError, MessagingService, MAX_MESSAGE_LEN, MIN_GROUP_OTHERS};
pub use views::ConversationSummary;
