//! The friend graph: directed pending requests, undirected friendships, and
//! the relationship state derived from them.

pub mod domain;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    FriendRequest, FriendRequestStatus, Friendship, FriendshipId, RelationshipState, RequestId,
};
pub use repository::FriendRepository;
pub use resolver::RelationshipIndex;
pub use router::friend_router;
pub use service::{
    DiscoverCandidate, FriendGraphError, FriendGraphService, PendingOverview, RequestWithProfile,
    MAX_NOTE_LEN,
};
