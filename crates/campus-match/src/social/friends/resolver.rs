use std::collections::{HashMap, HashSet};

use super::domain::{FriendRequest, Friendship, RelationshipState, RequestId};
use crate::social::profiles::ProfileId;

/// Snapshot of a viewer's relationships, built from the friendship rows
/// touching the viewer plus their pending requests in both directions.
///
/// `state_for` applies a fixed priority: an existing friendship wins over
/// any request row (a stale pending row must never mask an established
/// friendship), then the viewer's own outgoing request, then an incoming
/// one.
#[derive(Debug, Clone)]
pub struct RelationshipIndex {
    friend_ids: HashSet<ProfileId>,
    sent_pending: HashMap<ProfileId, RequestId>,
    received_pending: HashMap<ProfileId, RequestId>,
}

impl RelationshipIndex {
    pub fn build(
        viewer: &ProfileId,
        friendships: &[Friendship],
        sent: &[FriendRequest],
        received: &[FriendRequest],
    ) -> Self {
        let friend_ids = friendships
            .iter()
            .filter_map(|friendship| friendship.other_side(viewer))
            .cloned()
            .collect();

        // Filter to pending even if the caller already did: resolved rows
        // must never influence the derived state.
        let sent_pending = sent
            .iter()
            .filter(|request| request.is_pending() && request.from_user == *viewer)
            .map(|request| (request.to_user.clone(), request.id.clone()))
            .collect();

        let received_pending = received
            .iter()
            .filter(|request| request.is_pending() && request.to_user == *viewer)
            .map(|request| (request.from_user.clone(), request.id.clone()))
            .collect();

        Self {
            friend_ids,
            sent_pending,
            received_pending,
        }
    }

    pub fn state_for(&self, candidate: &ProfileId) -> RelationshipState {
        if self.friend_ids.contains(candidate) {
            RelationshipState::Friends
        } else if self.sent_pending.contains_key(candidate) {
            RelationshipState::RequestSent
        } else if self.received_pending.contains_key(candidate) {
            RelationshipState::RequestReceived
        } else {
            RelationshipState::None
        }
    }

    pub fn is_friend(&self, candidate: &ProfileId) -> bool {
        self.friend_ids.contains(candidate)
    }

    pub fn sent_request_to(&self, candidate: &ProfileId) -> Option<&RequestId> {
        self.sent_pending.get(candidate)
    }

    pub fn received_request_from(&self, candidate: &ProfileId) -> Option<&RequestId> {
        self.received_pending.get(candidate)
    }

    pub fn friend_ids(&self) -> impl Iterator<Item = &ProfileId> {
        self.friend_ids.iter()
    }
}
