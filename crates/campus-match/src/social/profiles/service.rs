use std::sync::Arc;

use chrono::Utc;

use super::domain::{Profile, ProfileDraft, ProfileId, MAX_BIO_LEN};
use super::repository::ProfileRepository;
use crate::social::storage::RepositoryError;

/// Owner-scoped profile reads and writes.
pub struct ProfileService<P> {
    profiles: Arc<P>,
}

impl<P> ProfileService<P>
where
    P: ProfileRepository + 'static,
{
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    /// Create or replace the actor's own profile. `created_at` survives
    /// re-onboarding; `updated_at` always moves forward.
    pub fn upsert(&self, actor: &ProfileId, draft: ProfileDraft) -> Result<Profile, ProfileError> {
        if draft.full_name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if let Some(bio) = &draft.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                return Err(ProfileError::BioTooLong {
                    len: bio.chars().count(),
                });
            }
        }

        let now = Utc::now();
        let created_at = self
            .profiles
            .fetch(actor)?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let profile = Profile {
            id: actor.clone(),
            full_name: draft.full_name.trim().to_string(),
            username: draft.username,
            pronouns: draft.pronouns,
            major: draft.major,
            year: draft.year,
            bio: draft.bio,
            interests: draft.interests,
            looking_for: draft.looking_for,
            campus_area: draft.campus_area,
            avatar_url: draft.avatar_url,
            created_at,
            updated_at: now,
        };

        let stored = self.profiles.upsert(profile)?;
        tracing::info!(profile = %stored.id, "profile upserted");
        Ok(stored)
    }

    pub fn fetch(&self, id: &ProfileId) -> Result<Profile, ProfileError> {
        self.profiles
            .fetch(id)?
            .ok_or_else(|| ProfileError::UnknownProfile(id.clone()))
    }
}

/// Error raised by profile reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("display name must not be empty")]
    EmptyName,
    #[error("bio exceeds {MAX_BIO_LEN} characters (got {len})")]
    BioTooLong { len: usize },
    #[error("profile {0} does not exist")]
    UnknownProfile(ProfileId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
