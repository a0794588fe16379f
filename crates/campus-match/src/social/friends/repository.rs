use chrono::{DateTime, Utc};

use super::domain::{FriendRequest, FriendRequestStatus, Friendship, RequestId};
use crate::social::profiles::ProfileId;
use crate::social::storage::RepositoryError;

/// Storage abstraction over friend-request and friendship rows.
///
/// The two resolve methods are atomic conditional updates guarded by
/// "current status = pending": when two actors race, exactly one wins and
/// the other observes `Conflict`. `accept_pending` additionally creates the
/// friendship row inside the same unit, so a failure leaves neither an
/// accepted request without a friendship nor the reverse.
pub trait FriendRepository: Send + Sync {
    /// Insert a new pending request. `Err(Conflict)` when a pending request
    /// for the same ordered (from, to) pair already exists.
    fn create_request(&self, request: FriendRequest) -> Result<FriendRequest, RepositoryError>;

    fn fetch_request(&self, id: &RequestId) -> Result<Option<FriendRequest>, RepositoryError>;

    fn pending_sent(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError>;

    fn pending_received(&self, user: &ProfileId) -> Result<Vec<FriendRequest>, RepositoryError>;

    /// Atomically flip a pending request to accepted, stamp `responded_at`,
    /// and materialize the friendship edge.
    fn accept_pending(
        &self,
        id: &RequestId,
        at: DateTime<Utc>,
    ) -> Result<Friendship, RepositoryError>;

    /// Atomically flip a pending request to `status` (declined or canceled)
    /// and stamp `responded_at`.
    fn resolve_pending(
        &self,
        id: &RequestId,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RepositoryError>;

    /// Friendship rows touching `user`, regardless of which column holds
    /// them.
    fn friendships_of(&self, user: &ProfileId) -> Result<Vec<Friendship>, RepositoryError>;
}
