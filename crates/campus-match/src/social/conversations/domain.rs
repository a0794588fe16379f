use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::social::profiles::ProfileId;

/// Identifier wrapper for conversations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The unordered participant pair identifying a direct conversation. The
/// constructor normalizes the ordering, so `(a, b)` and `(b, a)` produce
/// equal pairs and address the same conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectPair {
    a: ProfileId,
    b: ProfileId,
}

impl DirectPair {
    /// `None` when both sides are the same profile; a student cannot chat
    /// with themselves.
    pub fn new(x: ProfileId, y: ProfileId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, id: &ProfileId) -> bool {
        self.a == *id || self.b == *id
    }

    pub fn other(&self, viewer: &ProfileId) -> Option<&ProfileId> {
        if self.a == *viewer {
            Some(&self.b)
        } else if self.b == *viewer {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn sides(&self) -> (&ProfileId, &ProfileId) {
        (&self.a, &self.b)
    }
}

/// Direct chats are addressed by their pair; groups carry an optional
/// display name and an explicit member set held by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationKind {
    Direct { pair: DirectPair },
    Group { name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub kind: ConversationKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ConversationKind::Group { .. })
    }

    pub fn direct_pair(&self) -> Option<&DirectPair> {
        match &self.kind {
            ConversationKind::Direct { pair } => Some(pair),
            ConversationKind::Group { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: ProfileId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// A message is unread for a viewer when someone else sent it and its
    /// read marker is unset.
    pub fn unread_for(&self, viewer: &ProfileId) -> bool {
        self.sender != *viewer && self.read_at.is_none()
    }
}
