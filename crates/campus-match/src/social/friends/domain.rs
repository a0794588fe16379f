use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::social::profiles::ProfileId;

/// Identifier wrapper for friend requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for friendship rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriendshipId(pub String);

/// Lifecycle of a friend request: created pending, resolved exactly once.
/// The three resolved states are terminal and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
    Canceled,
}

impl FriendRequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Declined => "declined",
            FriendRequestStatus::Canceled => "canceled",
        }
    }
}

/// Directed proposal to establish a friendship. At most one *pending* row
/// may exist per ordered (from, to) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: RequestId,
    pub from_user: ProfileId,
    pub to_user: ProfileId,
    pub status: FriendRequestStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

/// Mutual, undirected edge between two profiles, created only by accepting
/// a request. The row stores one ordering; readers must query from both
/// sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: FriendshipId,
    pub user_a: ProfileId,
    pub user_b: ProfileId,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// The counterpart of `viewer`, or `None` when the viewer is not on
    /// this edge.
    pub fn other_side(&self, viewer: &ProfileId) -> Option<&ProfileId> {
        if self.user_a == *viewer {
            Some(&self.user_b)
        } else if self.user_b == *viewer {
            Some(&self.user_a)
        } else {
            None
        }
    }
}

/// Relationship between a viewer and a candidate, computed on demand from
/// the friendship and pending-request sets. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    None,
    Friends,
    RequestSent,
    RequestReceived,
}

impl RelationshipState {
    pub const fn label(self) -> &'static str {
        match self {
            RelationshipState::None => "none",
            RelationshipState::Friends => "friends",
            RelationshipState::RequestSent => "request_sent",
            RelationshipState::RequestReceived => "request_received",
        }
    }
}
