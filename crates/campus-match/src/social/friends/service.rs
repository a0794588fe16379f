use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::domain::{
    FriendRequest, FriendRequestStatus, Friendship, RelationshipState, RequestId,
};
use super::repository::FriendRepository;
use super::resolver::RelationshipIndex;
use crate::social::matching::{DiscoverFilter, MatchScorer};
use crate::social::profiles::{Profile, ProfileCard, ProfileId, ProfileRepository};
use crate::social::storage::RepositoryError;

/// Upper bound on the optional note attached to a request.
pub const MAX_NOTE_LEN: usize = 280;

/// Candidate batch size pulled for a discovery pass.
const DISCOVER_BATCH: usize = 50;

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

/// Service owning the friend-request lifecycle, relationship derivation,
/// and the discovery feed that combines both with the match scorer.
pub struct FriendGraphService<R, P> {
    repository: Arc<R>,
    profiles: Arc<P>,
    scorer: MatchScorer,
}

impl<R, P> FriendGraphService<R, P>
where
    R: FriendRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(repository: Arc<R>, profiles: Arc<P>, scorer: MatchScorer) -> Self {
        Self {
            repository,
            profiles,
            scorer,
        }
    }

    /// Create a pending request from `from` to `to`. Legal only when no
    /// relationship exists in either direction; a pending invite from the
    /// counterpart must be answered, not mirrored.
    pub fn send_request(
        &self,
        from: &ProfileId,
        to: &ProfileId,
        note: Option<String>,
    ) -> Result<FriendRequest, FriendGraphError> {
        if from == to {
            return Err(FriendGraphError::SelfRequest);
        }
        let note = match note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            Some(n) if n.chars().count() > MAX_NOTE_LEN => {
                return Err(FriendGraphError::NoteTooLong)
            }
            other => other,
        };
        if self.profiles.fetch(to)?.is_none() {
            return Err(FriendGraphError::UnknownProfile(to.clone()));
        }

        let index = self.relationship_index(from)?;
        match index.state_for(to) {
            RelationshipState::Friends => {
                return Err(FriendGraphError::AlreadyFriends(to.clone()))
            }
            RelationshipState::RequestSent => {
                return Err(FriendGraphError::AlreadyPending(to.clone()))
            }
            RelationshipState::RequestReceived => {
                return Err(FriendGraphError::CounterpartPending(to.clone()))
            }
            RelationshipState::None => {}
        }

        let request = FriendRequest {
            id: next_request_id(),
            from_user: from.clone(),
            to_user: to.clone(),
            status: FriendRequestStatus::Pending,
            note,
            created_at: Utc::now(),
            responded_at: None,
        };

        let stored = self.repository.create_request(request)?;
        tracing::info!(request = %stored.id, from = %from, to = %to, "friend request sent");
        Ok(stored)
    }

    /// Accept a pending request addressed to `viewer`. The repository flips
    /// the status and creates the friendship in one atomic unit, so a
    /// concurrent second accept observes a conflict instead of minting a
    /// second edge.
    pub fn accept_request(
        &self,
        viewer: &ProfileId,
        id: &RequestId,
    ) -> Result<Friendship, FriendGraphError> {
        let request = self.pending_addressed_to(viewer, id)?;
        let friendship = self.repository.accept_pending(&request.id, Utc::now())?;
        tracing::info!(request = %request.id, from = %request.from_user, to = %request.to_user, "friend request accepted");
        Ok(friendship)
    }

    /// Decline a pending request addressed to `viewer`. No friendship is
    /// created, and the sender is free to request again later.
    pub fn decline_request(
        &self,
        viewer: &ProfileId,
        id: &RequestId,
    ) -> Result<FriendRequest, FriendGraphError> {
        let request = self.pending_addressed_to(viewer, id)?;
        let resolved =
            self.repository
                .resolve_pending(&request.id, FriendRequestStatus::Declined, Utc::now())?;
        tracing::info!(request = %resolved.id, "friend request declined");
        Ok(resolved)
    }

    /// Cancel a pending request originally sent by `viewer`.
    pub fn cancel_request(
        &self,
        viewer: &ProfileId,
        id: &RequestId,
    ) -> Result<FriendRequest, FriendGraphError> {
        let request = self
            .repository
            .fetch_request(id)?
            .ok_or_else(|| FriendGraphError::UnknownRequest(id.clone()))?;
        if request.from_user != *viewer {
            return Err(FriendGraphError::NotSender);
        }
        if !request.is_pending() {
            return Err(FriendGraphError::AlreadyResolved {
                status: request.status,
            });
        }
        let resolved =
            self.repository
                .resolve_pending(&request.id, FriendRequestStatus::Canceled, Utc::now())?;
        tracing::info!(request = %resolved.id, "friend request canceled");
        Ok(resolved)
    }

    /// Build the viewer's relationship snapshot from storage.
    pub fn relationship_index(
        &self,
        viewer: &ProfileId,
    ) -> Result<RelationshipIndex, FriendGraphError> {
        let friendships = self.repository.friendships_of(viewer)?;
        let sent = self.repository.pending_sent(viewer)?;
        let received = self.repository.pending_received(viewer)?;
        Ok(RelationshipIndex::build(
            viewer,
            &friendships,
            &sent,
            &received,
        ))
    }

    pub fn relationship(
        &self,
        viewer: &ProfileId,
        candidate: &ProfileId,
    ) -> Result<RelationshipState, FriendGraphError> {
        Ok(self.relationship_index(viewer)?.state_for(candidate))
    }

    /// The viewer's friends as profiles.
    pub fn friends(&self, viewer: &ProfileId) -> Result<Vec<Profile>, FriendGraphError> {
        let index = self.relationship_index(viewer)?;
        let ids: Vec<ProfileId> = index.friend_ids().cloned().collect();
        Ok(self.profiles.fetch_many(&ids)?)
    }

    /// Pending requests in both directions, joined with the counterpart's
    /// profile. Rows whose counterpart no longer resolves are dropped.
    pub fn pending_overview(
        &self,
        viewer: &ProfileId,
    ) -> Result<PendingOverview, FriendGraphError> {
        let incoming = self.repository.pending_received(viewer)?;
        let sent = self.repository.pending_sent(viewer)?;

        let mut counterpart_ids: Vec<ProfileId> = incoming
            .iter()
            .map(|request| request.from_user.clone())
            .chain(sent.iter().map(|request| request.to_user.clone()))
            .collect();
        counterpart_ids.sort();
        counterpart_ids.dedup();
        let profiles = self.profiles.fetch_many(&counterpart_ids)?;

        let card_for = |id: &ProfileId| -> Option<ProfileCard> {
            profiles
                .iter()
                .find(|profile| profile.id == *id)
                .map(Profile::card)
        };

        Ok(PendingOverview {
            incoming: incoming
                .into_iter()
                .filter_map(|request| {
                    card_for(&request.from_user)
                        .map(|profile| RequestWithProfile { request, profile })
                })
                .collect(),
            sent: sent
                .into_iter()
                .filter_map(|request| {
                    card_for(&request.to_user).map(|profile| RequestWithProfile { request, profile })
                })
                .collect(),
        })
    }

    /// The discovery feed: recent candidates minus existing friends, scored
    /// against the viewer, annotated with any pending request direction, and
    /// ordered best match first.
    pub fn discover(
        &self,
        viewer: &ProfileId,
        filter: &DiscoverFilter,
    ) -> Result<Vec<DiscoverCandidate>, FriendGraphError> {
        let me = self
            .profiles
            .fetch(viewer)?
            .ok_or_else(|| FriendGraphError::UnknownProfile(viewer.clone()))?;
        let index = self.relationship_index(viewer)?;

        let candidates: Vec<Profile> = self
            .profiles
            .candidates(viewer, DISCOVER_BATCH)?
            .into_iter()
            .filter(|profile| !index.is_friend(&profile.id))
            .filter(|profile| filter.matches(profile))
            .collect();

        Ok(self
            .scorer
            .rank(&me, candidates)
            .into_iter()
            .map(|(profile, result)| DiscoverCandidate {
                relationship: index.state_for(&profile.id),
                profile: profile.card(),
                score: result.score,
                reasons: result.reasons,
            })
            .collect())
    }

    fn pending_addressed_to(
        &self,
        viewer: &ProfileId,
        id: &RequestId,
    ) -> Result<FriendRequest, FriendGraphError> {
        let request = self
            .repository
            .fetch_request(id)?
            .ok_or_else(|| FriendGraphError::UnknownRequest(id.clone()))?;
        if request.to_user != *viewer {
            return Err(FriendGraphError::NotRecipient);
        }
        if !request.is_pending() {
            return Err(FriendGraphError::AlreadyResolved {
                status: request.status,
            });
        }
        Ok(request)
    }
}

/// Pending requests joined with counterpart profiles, as served to the
/// requests page.
#[derive(Debug, Clone, Serialize)]
pub struct PendingOverview {
    pub incoming: Vec<RequestWithProfile>,
    pub sent: Vec<RequestWithProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestWithProfile {
    pub request: FriendRequest,
    pub profile: ProfileCard,
}

/// A scored, relationship-annotated entry in the discovery feed.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverCandidate {
    pub profile: ProfileCard,
    pub score: u8,
    pub reasons: Vec<String>,
    pub relationship: RelationshipState,
}

/// Error raised by friend-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum FriendGraphError {
    #[error("cannot send a friend request to yourself")]
    SelfRequest,
    #[error("note exceeds {MAX_NOTE_LEN} characters")]
    NoteTooLong,
    #[error("profile {0} does not exist")]
    UnknownProfile(ProfileId),
    #[error("request {0} does not exist")]
    UnknownRequest(RequestId),
    #[error("already friends with {0}")]
    AlreadyFriends(ProfileId),
    #[error("a pending request to {0} already exists")]
    AlreadyPending(ProfileId),
    #[error("{0} already sent you a request; respond to that one instead")]
    CounterpartPending(ProfileId),
    #[error("only the recipient can respond to a request")]
    NotRecipient,
    #[error("only the sender can cancel a request")]
    NotSender,
    #[error("request already {}", .status.label())]
    AlreadyResolved { status: FriendRequestStatus },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
