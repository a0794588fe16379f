use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    Conversation, ConversationId, ConversationKind, DirectPair, Message, MessageId,
};
use super::events::{MessageEvent, MessagePublisher, PublishError};
use super::repository::ConversationRepository;
use super::views::{display_name, ConversationSummary};
use crate::social::profiles::{Profile, ProfileId, ProfileRepository};
use crate::social::storage::RepositoryError;

/// Upper bound on a single message body.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Minimum count of members besides the creator; a group always has at
/// least three participants in total.
pub const MIN_GROUP_OTHERS: usize = 2;

static CONVERSATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static MESSAGE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_conversation_id() -> ConversationId {
    let id = CONVERSATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ConversationId(format!("grp-{id:06}"))
}

fn next_message_id() -> MessageId {
    let id = MESSAGE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MessageId(format!("msg-{id:06}"))
}

/// Service owning conversation identity, message flow, and unread
/// accounting.
pub struct MessagingService<C, P, B> {
    conversations: Arc<C>,
    profiles: Arc<P>,
    events: Arc<B>,
}

impl<C, P, B> MessagingService<C, P, B>
where
    C: ConversationRepository + 'static,
    P: ProfileRepository + 'static,
    B: MessagePublisher + 'static,
{
    pub fn new(conversations: Arc<C>, profiles: Arc<P>, events: Arc<B>) -> Self {
        Self {
            conversations,
            profiles,
            events,
        }
    }

    /// Open the direct conversation between `viewer` and `other`, creating
    /// it on first use. Idempotent in both arguments and their order.
    pub fn open_direct(
        &self,
        viewer: &ProfileId,
        other: &ProfileId,
    ) -> Result<Conversation, MessagingError> {
        if self.profiles.fetch(other)?.is_none() {
            return Err(MessagingError::UnknownProfile(other.clone()));
        }
        let pair = DirectPair::new(viewer.clone(), other.clone())
            .ok_or(MessagingError::SelfConversation)?;
        let conversation = self.conversations.get_or_create_direct(pair, Utc::now())?;
        Ok(conversation)
    }

    /// Create a group conversation from the creator plus at least
    /// `MIN_GROUP_OTHERS` distinct other members.
    pub fn create_group(
        &self,
        creator: &ProfileId,
        name: Option<String>,
        members: Vec<ProfileId>,
    ) -> Result<Conversation, MessagingError> {
        let mut others: Vec<ProfileId> = members
            .into_iter()
            .filter(|member| member != creator)
            .collect();
        others.sort();
        others.dedup();
        if others.len() < MIN_GROUP_OTHERS {
            return Err(MessagingError::GroupTooSmall {
                selected: others.len(),
            });
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: next_conversation_id(),
            kind: ConversationKind::Group {
                name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            },
            created_at: now,
            updated_at: now,
        };

        let mut all_members = Vec::with_capacity(others.len() + 1);
        all_members.push(creator.clone());
        all_members.extend(others);

        let stored = self.conversations.create_group(conversation, all_members)?;
        tracing::info!(conversation = %stored.id, creator = %creator, "group conversation created");
        Ok(stored)
    }

    /// Persist a message from `viewer` and publish the corresponding event.
    pub fn send_message(
        &self,
        viewer: &ProfileId,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<Message, MessagingError> {
        let content = content.trim();
        if content.is_empty() || content.chars().count() > MAX_MESSAGE_LEN {
            return Err(MessagingError::InvalidContent);
        }
        self.participant_guard(viewer, conversation_id)?;

        let message = Message {
            id: next_message_id(),
            conversation_id: conversation_id.clone(),
            sender: viewer.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
            read_at: None,
        };

        let stored = self.conversations.append_message(message)?;
        self.events.publish(MessageEvent {
            message_id: stored.id.clone(),
            conversation_id: stored.conversation_id.clone(),
            sender: stored.sender.clone(),
        })?;
        Ok(stored)
    }

    /// The viewer's conversations, most recently active first, with display
    /// metadata and unread counts.
    pub fn conversation_list(
        &self,
        viewer: &ProfileId,
    ) -> Result<Vec<ConversationSummary>, MessagingError> {
        let mut conversations = self.conversations.conversations_of(viewer)?;
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let member_ids: Vec<ProfileId> = self
                .conversations
                .members(&conversation.id)?
                .into_iter()
                .filter(|member| member != viewer)
                .collect();
            let others = self.profiles.fetch_many(&member_ids)?;

            // Direct chats surface the counterpart's avatar; groups have no
            // avatar of their own.
            let display_avatar = match &conversation.kind {
                ConversationKind::Direct { .. } => {
                    others.first().and_then(|profile| profile.avatar_url.clone())
                }
                ConversationKind::Group { .. } => None,
            };

            summaries.push(ConversationSummary {
                display_name: display_name(&conversation, &others),
                display_avatar,
                participants: others.iter().map(Profile::card).collect(),
                last_message: self.conversations.last_message(&conversation.id)?,
                unread_count: self.conversations.unread_count(&conversation.id, viewer)?,
                is_group: conversation.is_group(),
                updated_at: conversation.updated_at,
                id: conversation.id,
            });
        }
        Ok(summaries)
    }

    /// Messages in creation order; participant-only.
    pub fn messages(
        &self,
        viewer: &ProfileId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, MessagingError> {
        self.participant_guard(viewer, conversation_id)?;
        Ok(self.conversations.messages(conversation_id)?)
    }

    /// Mark everything unread for `viewer` as read. Monotonic; returns the
    /// number newly marked.
    pub fn mark_read(
        &self,
        viewer: &ProfileId,
        conversation_id: &ConversationId,
    ) -> Result<usize, MessagingError> {
        self.participant_guard(viewer, conversation_id)?;
        let marked = self
            .conversations
            .mark_read(conversation_id, viewer, Utc::now())?;
        Ok(marked)
    }

    fn participant_guard(
        &self,
        viewer: &ProfileId,
        conversation_id: &ConversationId,
    ) -> Result<(), MessagingError> {
        let conversation = self
            .conversations
            .fetch(conversation_id)?
            .ok_or_else(|| MessagingError::UnknownConversation(conversation_id.clone()))?;
        let is_member = match conversation.direct_pair() {
            Some(pair) => pair.contains(viewer),
            None => self
                .conversations
                .members(conversation_id)?
                .iter()
                .any(|member| member == viewer),
        };
        if is_member {
            Ok(())
        } else {
            Err(MessagingError::NotParticipant(conversation_id.clone()))
        }
    }
}

/// Error raised by conversation operations.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("cannot start a conversation with yourself")]
    SelfConversation,
    #[error("profile {0} does not exist")]
    UnknownProfile(ProfileId),
    #[error("conversation {0} does not exist")]
    UnknownConversation(ConversationId),
    #[error("a group needs at least {MIN_GROUP_OTHERS} other members, got {selected}")]
    GroupTooSmall { selected: usize },
    #[error("not a participant in conversation {0}")]
    NotParticipant(ConversationId),
    #[error("message content must be 1..={MAX_MESSAGE_LEN} characters")]
    InvalidContent,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}
