use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Conversation, ConversationId, ConversationKind, Message};
use crate::social::profiles::{Profile, ProfileCard};

/// A conversation as listed on the messages page: display metadata, the
/// latest message, and the viewer's unread count.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub is_group: bool,
    pub display_name: String,
    pub display_avatar: Option<String>,
    pub participants: Vec<ProfileCard>,
    pub last_message: Option<Message>,
    pub unread_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Derive the name shown for a conversation. A presentation rule, not
/// stored state: it must be recomputed whenever membership changes.
/// `others` are the participants excluding the viewer.
pub fn display_name(conversation: &Conversation, others: &[Profile]) -> String {
    match &conversation.kind {
        ConversationKind::Group { name } => match name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => unnamed_group_title(others),
        },
        ConversationKind::Direct { .. } => others
            .first()
            .map(|profile| profile.full_name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

/// First names of the first three other members, with a "+N" tail when the
/// group is larger.
fn unnamed_group_title(others: &[Profile]) -> String {
    if others.is_empty() {
        return "Group Chat".to_string();
    }
    let mut title = others
        .iter()
        .take(3)
        .map(Profile::first_name)
        .collect::<Vec<_>>()
        .join(", ");
    if others.len() > 3 {
        title.push_str(&format!(" +{}", others.len() - 3));
    }
    title
}
