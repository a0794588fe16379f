//! Student profiles: the attributes every other concern matches, joins, and
//! displays against.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ClassYear, Profile, ProfileCard, ProfileDraft, ProfileId, MAX_BIO_LEN};
pub use repository::ProfileRepository;
pub use router::profile_router;
pub use service::{ProfileError, ProfileService};
