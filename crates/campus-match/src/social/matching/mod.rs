//! Compatibility scoring between two profiles.
//!
//! The scorer is pure and total: absent fields contribute nothing, nothing
//! here performs I/O or fails. Scores are the sum of per-factor
//! contributions whose caps add up to exactly 100, and every contribution
//! carries a human-readable reason so the UI can explain a match.

mod rules;


pub use rules::{MatchFactor, ScoreComponent};

use serde::{Deserialize, Serialize};

use super::profiles::{ClassYear, Profile};

/// Per-factor points and caps. The defaults are the product formula; the
/// caps sum to 100 so an uncapped total can never exceed the percentage
/// scale.
#[derive(Debug, Clone)]
pub struct MatchWeights {
    pub interest_points: u32,
    pub interest_cap: u32,
    pub major_points: u32,
    pub year_points: u32,
    pub looking_for_points: u32,
    pub looking_for_cap: u32,
    pub area_points: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            interest_points: 10,
            interest_cap: 50,
            major_points: 15,
            year_points: 10,
            looking_for_points: 10,
            looking_for_cap: 20,
            area_points: 5,
        }
    }
}

/// Derived compatibility between two profiles. Never persisted; recomputed
/// on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Stateless scorer applying the weight table to a profile pair.
#[derive(Debug, Clone, Default)]
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    /// Score `candidate` against `viewer`. Reason order follows the factor
    /// table and is stable across calls; callers display a prefix of it.
    pub fn score(&self, viewer: &Profile, candidate: &Profile) -> MatchResult {
        let components = rules::score_pair(viewer, candidate, &self.weights);
        let total: u32 = components.iter().map(|c| c.points).sum();

        MatchResult {
            // The caps already bound the sum at 100; the outer clamp stays
            // as an invariant of the percentage scale.
            score: total.min(100) as u8,
            reasons: components.into_iter().map(|c| c.reason).collect(),
        }
    }

    /// Score a candidate batch and order it best-first. Ties keep the input
    /// order, which upstream sorts by recency.
    pub fn rank(&self, viewer: &Profile, candidates: Vec<Profile>) -> Vec<(Profile, MatchResult)> {
        let mut ranked: Vec<(Profile, MatchResult)> = candidates
            .into_iter()
            .map(|candidate| {
                let result = self.score(viewer, &candidate);
                (candidate, result)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        ranked
    }
}

/// Client-side discovery filters: an exact class year and an any-of
/// interest set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverFilter {
    pub year: Option<ClassYear>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl DiscoverFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(year) = self.year {
            if profile.year != Some(year) {
                return false;
            }
        }
        if !self.interests.is_empty()
            && !self
                .interests
                .iter()
                .any(|interest| profile.interests.contains(interest))
        {
            return false;
        }
        true
    }
}
