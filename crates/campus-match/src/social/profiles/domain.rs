use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for profiles. Minted by the external identity
/// provider, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Academic standing. Everything past a fourth year collapses into `Grad`,
/// and non-degree students pick `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassYear {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Grad,
    Other,
}

impl ClassYear {
    pub const fn label(self) -> &'static str {
        match self {
            ClassYear::Freshman => "Freshman",
            ClassYear::Sophomore => "Sophomore",
            ClassYear::Junior => "Junior",
            ClassYear::Senior => "Senior",
            ClassYear::Grad => "Grad",
            ClassYear::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Freshman" => Some(ClassYear::Freshman),
            "Sophomore" => Some(ClassYear::Sophomore),
            "Junior" => Some(ClassYear::Junior),
            "Senior" => Some(ClassYear::Senior),
            "Grad" => Some(ClassYear::Grad),
            "Other" => Some(ClassYear::Other),
            _ => None,
        }
    }
}

/// Upper bound on the free-text bio, enforced at upsert time.
pub const MAX_BIO_LEN: usize = 500;

/// A student's public attributes. Optional fields are simply absent for
/// matching purposes, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub full_name: String,
    pub username: Option<String>,
    pub pronouns: Option<String>,
    pub major: Option<String>,
    pub year: Option<ClassYear>,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub looking_for: Vec<String>,
    pub campus_area: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// First whitespace-separated token of the display name, used when
    /// deriving group-chat titles.
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.full_name)
    }

    pub fn card(&self) -> ProfileCard {
        ProfileCard {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            pronouns: self.pronouns.clone(),
            major: self.major.clone(),
            year: self.year.map(ClassYear::label),
            campus_area: self.campus_area.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Compact profile view embedded in discovery, request, and conversation
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileCard {
    pub id: ProfileId,
    pub full_name: String,
    pub pronouns: Option<String>,
    pub major: Option<String>,
    pub year: Option<&'static str>,
    pub campus_area: Option<String>,
    pub avatar_url: Option<String>,
}

/// Owner-supplied attributes accepted at onboarding and profile edits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub year: Option<ClassYear>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub looking_for: Vec<String>,
    #[serde(default)]
    pub campus_area: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
