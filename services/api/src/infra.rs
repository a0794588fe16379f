use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use campus_match::social::conversations::{
    Conversation, ConversationId, ConversationKind, ConversationRepository, DirectPair, Message,
};
use campus_match::social::friends::{
    FriendRepository, FriendRequest, FriendRequestStatus, Friendship, FriendshipId, RequestId,
};
use campus_match::social::profiles::{Profile, ProfileId, ProfileRepository};
use campus_match::social::storage::RepositoryError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory stand-in for the profile table.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<ProfileId, Profile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
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
struct FriendStore {
    requests: HashMap<RequestId, FriendRequest>,
    friendships: Vec<Friendship>,
    friendship_sequence: u64,
}

/// In-memory stand-in for the friend-request and friendship tables. One
/// mutex covers both, which is what makes `accept_pending` a single atomic
/// conditional unit: the first accept wins and a racer observes `Conflict`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFriendRepository {
    store: Arc<Mutex<FriendStore>>,
}

impl FriendRepository for InMemoryFriendRepository {
    fn create_request(&self, request: FriendRequest) -> Result<FriendRequest, RepositoryError> {
        let mut store = self.store.lock().expect("friend mutex poisoned");
        let duplicate = store.requests.values().any(|existing| {
            existing.is_pending()
                && existing.from_user == request.from_user
                && existing.to_user == request.to_user
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        store.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<FriendRequest>, RepositoryError> {
        let store = self.store.lock().expect("friend mutex poisoned");
        Ok(store.requests.get(id).cloned())
    }

    fn pending_sent(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        let store = self.store.lock().expect("friend mutex poisoned");
        Ok(store
            .requests
            .values()
            .filter(|request| request.is_pending() && request.from_user == *user)
            .cloned()
            .collect())
    }

    fn pending_received(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        let store = self.store.lock().expect("friend mutex poisoned");
        Ok(store
            .requests
            .values()
            .filter(|request| request.is_pending() && request.to_user == *user)
            .cloned()
            .collect())
    }

    fn accept_pending(
        &self,
        id: &RequestId,
        at: DateTime<Utc>,
    ) -> Result<Friendship, RepositoryError> {
        let mut store = self.store.lock().expect("friend mutex poisoned");
        let (from, to) = {
            let request = store.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;
            if !request.is_pending() {
                return Err(RepositoryError::Conflict);
            }
            request.status = FriendRequestStatus::Accepted;
            request.responded_at = Some(at);
            (request.from_user.clone(), request.to_user.clone())
        };

        store.friendship_sequence += 1;
        let friendship = Friendship {
            id: FriendshipId(format!("fsp-{:06}", store.friendship_sequence)),
            user_a: from,
            user_b: to,
            created_at: at,
        };
        store.friendships.push(friendship.clone());
        Ok(friendship)
    }

    fn resolve_pending(
        &self,
        id: &RequestId,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RepositoryError> {
        let mut store = self.store.lock().expect("friend mutex poisoned");
        let request = store.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if !request.is_pending() {
            return Err(RepositoryError::Conflict);
        }
        request.status = status;
        request.responded_at = Some(at);
        Ok(request.clone())
    }

    fn friendships_of(&self, user: &ProfileId) -> Result<Vec<Friendship>, RepositoryError> {
        let store = self.store.lock().expect("friend mutex poisoned");
        Ok(store
            .friendships
            .iter()
            .filter(|friendship| friendship.other_side(user).is_some())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct ConversationStore {
    conversations: HashMap<ConversationId, Conversation>,
    direct_index: HashMap<DirectPair, ConversationId>,
    members: HashMap<ConversationId, Vec<ProfileId>>,
    messages: HashMap<ConversationId, Vec<Message>>,
    direct_sequence: u64,
}

/// In-memory stand-in for the conversation, membership, and message tables.
/// The index keyed by the normalized pair is what keeps
/// `get_or_create_direct` idempotent across argument orders.
#[derive(Default, Clone)]
pub(crate) struct InMemoryConversationRepository {
    store: Arc<Mutex<ConversationStore>>,
}

impl ConversationRepository for InMemoryConversationRepository {
    fn get_or_create_direct(
        &self,
        pair: DirectPair,
        at: DateTime<Utc>,
    ) -> Result<Conversation, RepositoryError> {
        let mut store = self.store.lock().expect("conversation mutex poisoned");
        if let Some(id) = store.direct_index.get(&pair) {
            return store
                .conversations
                .get(id)
                .cloned()
                .ok_or(RepositoryError::NotFound);
        }

        store.direct_sequence += 1;
        let id = ConversationId(format!("dm-{:06}", store.direct_sequence));
        let (a, b) = pair.sides();
        let members = vec![a.clone(), b.clone()];
        let conversation = Conversation {
            id: id.clone(),
            kind: ConversationKind::Direct { pair: pair.clone() },
            created_at: at,
            updated_at: at,
        };
        store.direct_index.insert(pair, id.clone());
        store.members.insert(id.clone(), members);
        store.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    fn create_group(
        &self,
        conversation: Conversation,
        members: Vec<ProfileId>,
    ) -> Result<Conversation, RepositoryError> {
        let mut store = self.store.lock().expect("conversation mutex poisoned");
        if store.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::Conflict);
        }
        store.members.insert(conversation.id.clone(), members);
        store
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    fn fetch(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        Ok(store.conversations.get(id).cloned())
    }

    fn conversations_of(&self, user: &ProfileId) -> Result<Vec<Conversation>, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        Ok(store
            .conversations
            .values()
            .filter(|conversation| {
                store
                    .members
                    .get(&conversation.id)
                    .is_some_and(|members| members.contains(user))
            })
            .cloned()
            .collect())
    }

    fn members(&self, id: &ConversationId) -> Result<Vec<ProfileId>, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        store
            .members
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn append_message(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().expect("conversation mutex poisoned");
        let conversation = store
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or(RepositoryError::NotFound)?;
        conversation.updated_at = message.created_at;
        store
            .messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    fn messages(&self, id: &ConversationId) -> Result<Vec<Message>, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        Ok(store.messages.get(id).cloned().unwrap_or_default())
    }

    fn last_message(&self, id: &ConversationId) -> Result<Option<Message>, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        Ok(store
            .messages
            .get(id)
            .and_then(|messages| messages.last().cloned()))
    }

    fn unread_count(
        &self,
        id: &ConversationId,
        viewer: &ProfileId,
    ) -> Result<usize, RepositoryError> {
        let store = self.store.lock().expect("conversation mutex poisoned");
        Ok(store
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
        let mut store = self.store.lock().expect("conversation mutex poisoned");
        let mut marked = 0;
        if let Some(messages) = store.messages.get_mut(id) {
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
