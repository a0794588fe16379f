use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::social::friends::domain::{
    FriendRequest, FriendRequestStatus, Friendship, FriendshipId, RequestId,
};
use crate::social::friends::repository::FriendRepository;
use crate::social::friends::service::FriendGraphService;
use crate::social::matching::MatchScorer;
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
        year: Some(ClassYear::Junior),
        bio: None,
        interests: vec!["Gaming".to_string(), "Music".to_string()],
        looking_for: vec!["Friends".to_string()],
        campus_area: Some("North Neighborhood".to_string()),
        avatar_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(super) fn pending_request(id: &str, from: &str, to: &str) -> FriendRequest {
    FriendRequest {
        id: RequestId(id.to_string()),
        from_user: profile_id(from),
        to_user: profile_id(to),
        status: FriendRequestStatus::Pending,
        note: None,
        created_at: Utc::now(),
        responded_at: None,
    }
}

pub(super) fn friendship(id: &str, a: &str, b: &str) -> Friendship {
    Friendship {
        id: FriendshipId(id.to_string()),
        user_a: profile_id(a),
        user_b: profile_id(b),
        created_at: Utc::now(),
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
struct FriendStoreInner {
    requests: HashMap<RequestId, FriendRequest>,
    friendships: Vec<Friendship>,
    friendship_sequence: u64,
}

#[derive(Default)]
pub(super) struct MemoryFriendRepository {
    inner: Mutex<FriendStoreInner>,
}

impl MemoryFriendRepository {
    pub(super) fn friendship_rows(&self) -> Vec<Friendship> {
        self.inner
            .lock()
            .expect("friend store mutex poisoned")
            .friendships
            .clone()
    }

    pub(super) fn insert_raw_request(&self, request: FriendRequest) {
        let mut inner = self.inner.lock().expect("friend store mutex poisoned");
        inner.requests.insert(request.id.clone(), request);
    }
}

impl FriendRepository for MemoryFriendRepository {
    fn create_request(&self, request: FriendRequest) -> Result<FriendRequest, RepositoryError> {
        let mut inner = self.inner.lock().expect("friend store mutex poisoned");
        let duplicate = inner.requests.values().any(|existing| {
            existing.is_pending()
                && existing.from_user == request.from_user
                && existing.to_user == request.to_user
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        inner.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_request(&self, id: &RequestId) -> Result<Option<FriendRequest>, RepositoryError> {
        let inner = self.inner.lock().expect("friend store mutex poisoned");
        Ok(inner.requests.get(id).cloned())
    }

    fn pending_sent(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        let inner = self.inner.lock().expect("friend store mutex poisoned");
        Ok(inner
            .requests
            .values()
            .filter(|request| request.is_pending() && request.from_user == *user)
            .cloned()
            .collect())
    }

    fn pending_received(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        let inner = self.inner.lock().expect("friend store mutex poisoned");
        Ok(inner
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
        let mut inner = self.inner.lock().expect("friend store mutex poisoned");
        let (from, to) = {
            let request = inner.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;
            if !request.is_pending() {
                return Err(RepositoryError::Conflict);
            }
            request.status = FriendRequestStatus::Accepted;
            request.responded_at = Some(at);
            (request.from_user.clone(), request.to_user.clone())
        };

        inner.friendship_sequence += 1;
        let friendship = Friendship {
            id: FriendshipId(format!("fsp-{:06}", inner.friendship_sequence)),
            user_a: from,
            user_b: to,
            created_at: at,
        };
        inner.friendships.push(friendship.clone());
        Ok(friendship)
    }

    fn resolve_pending(
        &self,
        id: &RequestId,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RepositoryError> {
        let mut inner = self.inner.lock().expect("friend store mutex poisoned");
        let request = inner.requests.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if !request.is_pending() {
            return Err(RepositoryError::Conflict);
        }
        request.status = status;
        request.responded_at = Some(at);
        Ok(request.clone())
    }

    fn friendships_of(&self, user: &ProfileId) -> Result<Vec<Friendship>, RepositoryError> {
        let inner = self.inner.lock().expect("friend store mutex poisoned");
        Ok(inner
            .friendships
            .iter()
            .filter(|friendship| friendship.other_side(user).is_some())
            .cloned()
            .collect())
    }
}

/// Repository that fails every call, for transient-error mapping tests.
pub(super) struct UnavailableFriendRepository;

impl FriendRepository for UnavailableFriendRepository {
    fn create_request(&self, _request: FriendRequest) -> Result<FriendRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_request(&self, _id: &RequestId) -> Result<Option<FriendRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_sent(&self, _user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_received(&self, _user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn accept_pending(
        &self,
        _id: &RequestId,
        _at: DateTime<Utc>,
    ) -> Result<Friendship, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn resolve_pending(
        &self,
        _id: &RequestId,
        _status: FriendRequestStatus,
        _at: DateTime<Utc>,
    ) -> Result<FriendRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn friendships_of(&self, _user: &ProfileId) -> Result<Vec<Friendship>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemoryGraphService =
    FriendGraphService<MemoryFriendRepository, MemoryProfileRepository>;

/// Service over fresh in-memory stores seeded with Ava, Ben, and Cleo.
pub(super) fn build_service() -> (
    MemoryGraphService,
    Arc<MemoryFriendRepository>,
    Arc<MemoryProfileRepository>,
) {
    let repository = Arc::new(MemoryFriendRepository::default());
    let profiles = Arc::new(MemoryProfileRepository::seeded(vec![
        profile("ava", "Ava Alvarez"),
        profile("ben", "Ben Brooks"),
        profile("cleo", "Cleo Chen"),
    ]));
    let service =
        FriendGraphService::new(repository.clone(), profiles.clone(), MatchScorer::default());
    (service, repository, profiles)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
