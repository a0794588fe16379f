use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::social::conversations::domain::{
    Conversation, ConversationId, ConversationKind, DirectPair, Message,
};
use crate::social::conversations::events::MessageBus;
use crate::social::conversations::repository::ConversationRepository;
use crate::social::conversations::service::MessagingService;
use crate::social::profiles::{ClassYear, Profile, ProfileId, ProfileRepository};
use crate::social::storage::RepositoryError;

pub(super) fn profile_id(raw: &str) -> ProfileId {
    ProfileId(raw.to_string())
}

pub(super) fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: profile_id(id),
        full_name: name.to_string(),
        username: None,
        pronouns: None,
        major: Some("Computer Science".to_string()),
        year: Some(ClassYear::Sophomore),
        bio: None,
        interests: Vec::new(),
        looking_for: Vec::new(),
        campus_area: None,
        avatar_url: Some(format!("https://cdn.example.edu/avatars/{id}.png")),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[derive(Default)]
pub(super) struct MemoryProfileRepository {
    profiles: Mutex<HashMap<ProfileId, Profile>>,
}

impl MemoryProfileRepository {
    pub(super) fn seeded(profiles: Vec<Profile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self {
            profiles: Mutex::new(map),
        }
    }
}

impl ProfileRepository for MemoryProfileRepository {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_many(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }

    fn candidates(
        &self,
        excluding: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Profile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        let mut candidates: Vec<Profile> = guard
            .values()
            .filter(|profile| profile.id != *excluding)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        candidates.truncate(limit);
        Ok(candidates)
    }
}

#[derive(Default)]
struct ConversationStoreInner {
    conversations: HashMap<ConversationId, Conversation>,
    direct_index: HashMap<DirectPair, ConversationId>,
    members: HashMap<ConversationId, Vec<ProfileId>>,
    messages: HashMap<ConversationId, Vec<Message>>,
    direct_sequence: u64,
}

#[derive(Default)]
pub(super) struct MemoryConversationRepository {
    inner: Mutex<ConversationStoreInner>,
}

impl ConversationRepository for MemoryConversationRepository {
    fn get_or_create_direct(
        &self,
        pair: DirectPair,
        at: DateTime<Utc>,
    ) -> Result<Conversation, RepositoryError> {
        let mut inner = self.inner.lock().expect("conversation mutex poisoned");
        if let Some(id) = inner.direct_index.get(&pair) {
            let conversation = inner
                .conversations
                .get(id)
                .cloned()
                .ok_or(RepositoryError::NotFound)?;
            return Ok(conversation);
        }

        inner.direct_sequence += 1;
        let id = ConversationId(format!("dm-{:06}", inner.direct_sequence));
        let (a, b) = pair.sides();
        let members = vec![a.clone(), b.clone()];
        let conversation = Conversation {
            id: id.clone(),
            kind: ConversationKind::Direct { pair: pair.clone() },
            created_at: at,
            updated_at: at,
        };
        inner.direct_index.insert(pair, id.clone());
        inner.members.insert(id.clone(), members);
        inner.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    fn create_group(
        &self,
        conversation: Conversation,
        members: Vec<ProfileId>,
    ) -> Result<Conversation, RepositoryError> {
        let mut inner = self.inner.lock().expect("conversation mutex poisoned");
        if inner.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.members.insert(conversation.id.clone(), members);
        inner
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        Ok(inner.conversations.get(id).cloned())
    }

    fn conversations_of(&self, user: &ProfileId) -> Result<Vec<Conversation>, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        Ok(inner
            .conversations
            .values()
            .filter(|conversation| {
                inner
                    .members
                    .get(&conversation.id)
                    .is_some_and(|members| members.contains(user))
            })
            .cloned()
            .collect())
    }

    fn members(&self, id: &ConversationId) -> Result<Vec<ProfileId>, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        inner.members.get(id).cloned().ok_or(RepositoryError::NotFound)
    }

    fn append_message(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut inner = self.inner.lock().expect("conversation mutex poisoned");
        let conversation = inner
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or(RepositoryError::NotFound)?;
        conversation.updated_at = message.created_at;
        inner
            .messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        Ok(inner.messages.get(id).cloned().unwrap_or_default())
    }

    fn last_message(&self, id: &ConversationId) -> Result<Option<Message>, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        Ok(inner
            .messages
            .get(id)
            .and_then(|messages| messages.last().cloned()))
    }

    fn unread_count(
        &self,
        id: &ConversationId,
        viewer: &ProfileId,
    ) -> Result<usize, RepositoryError> {
        let inner = self.inner.lock().expect("conversation mutex poisoned");
        Ok(inner
            .messages
            .get(id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|message| message.unread_for(viewer))
                    .count()
            })
            .unwrap_or(0))
    }

    fn mark_read(
        &self,
        id: &ConversationId,
        viewer: &ProfileId,
        at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut inner = self.inner.lock().expect("conversation mutex poisoned");
        let mut marked = 0;
        if let Some(messages) = inner.messages.get_mut(id) {
            for message in messages {
                if message.unread_for(viewer) {
                    message.read_at = Some(at);
                    marked += 1;
                }
            }
        }
        Ok(marked)
    }
}

pub(super) type MemoryMessagingService =
    MessagingService<MemoryConversationRepository, MemoryProfileRepository, MessageBus>;

/// Service over fresh in-memory stores seeded with four students.
pub(super) fn build_service() -> (
    MemoryMessagingService,
    Arc<MemoryConversationRepository>,
    Arc<MessageBus>,
) {
    let conversations = Arc::new(MemoryConversationRepository::default());
    let profiles = Arc::new(MemoryProfileRepository::seeded(vec![
        profile("ava", "Ava Alvarez"),
        profile("ben", "Ben Brooks"),
        profile("cleo", "Cleo Chen"),
        profile("dev", "Devon Diaz"),
    ]));
    let bus = Arc::new(MessageBus::default());
    let service = MessagingService::new(conversations.clone(), profiles, bus.clone());
    (service, conversations, bus)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
