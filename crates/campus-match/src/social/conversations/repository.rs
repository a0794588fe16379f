use chrono::{DateTime, Utc};

use super::domain::{Conversation, ConversationId, DirectPair, Message};
use crate::social::profiles::ProfileId;
use crate::social::storage::RepositoryError;

/// Storage abstraction over conversations, membership, and messages.
pub trait ConversationRepository: Send + Sync {
    /// Idempotent lookup-or-insert keyed by the normalized pair: repeated
    /// calls return the same conversation with a stable id, regardless of
    /// which side initiated.
    fn get_or_create_direct(
        &self,
        pair: DirectPair,
        at: DateTime<Utc>,
    ) -> Result<Conversation, RepositoryError>;

    /// Insert a group conversation with its member set.
    fn create_group(
        &self,
        conversation: Conversation,
        members: Vec<ProfileId>,
    ) -> Result<Conversation, RepositoryError>;

    fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError>;

    /// Every conversation `user` participates in, direct or group.
    fn conversations_of(&self, user: &ProfileId) -> Result<Vec<Conversation>, RepositoryError>;

    fn members(&self, id: &ConversationId) -> Result<Vec<ProfileId>, RepositoryError>;

    /// Append a message and bump the conversation's `updated_at` to the
    /// message timestamp.
    fn append_message(&self, message: Message) -> Result<Message, RepositoryError>;

    /// Messages in creation order.
    fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError>;

    fn last_message(&self, id: &ConversationId) -> Result<Option<Message>, RepositoryError>;

    fn unread_count(
        &self,
        id: &ConversationId,
        viewer: &ProfileId,
    ) -> Result<usize, RepositoryError>;

    /// Stamp `read_at` on every message in the conversation that is unread
    /// for `viewer`. Monotonic: messages already marked keep their original
    /// stamp. Returns the number newly marked.
    fn mark_read(
        &self,
        id: &ConversationId,
        viewer: &ProfileId,
        at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError>;
}
