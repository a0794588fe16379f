use super::domain::{Profile, ProfileId};
use crate::social::storage::RepositoryError;

/// Storage abstraction over the profile table.
///
/// `upsert` is an explicit insert-or-replace contract; implementations must
/// not rely on a uniqueness-violation error code to pick between the two.
pub trait ProfileRepository: Send + Sync {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError>;
    /// Fetch a batch by id; ids with no backing row are silently skipped.
    fn fetch_many(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, RepositoryError>;
    /// Profiles other than `excluding`, most recently updated first.
    fn candidates(
        &self,
        excluding: &ProfileId,
        limit: usize,
    ) -> Result<Vec<Profile>, RepositoryError>;
}
