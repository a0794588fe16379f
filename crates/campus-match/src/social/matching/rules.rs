use serde::Serialize;

use super::MatchWeights;
use crate::social::profiles::Profile;

/// Factors contributing to a match score, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchFactor {
    SharedInterests,
    SameMajor,
    SameYear,
    LookingFor,
    SameArea,
}

/// Discrete contribution to a score, with the reason shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    pub points: u32,
    pub reason: String,
}

/// Shared tags in the viewer's declaration order. Tag comparison is
/// case-sensitive: tags come from closed pick-lists, and an unknown tag
/// simply fails to match.
fn shared_tags<'a>(viewer: &'a [String], candidate: &[String]) -> Vec<&'a str> {
    viewer
        .iter()
        .filter(|tag| candidate.contains(tag))
        .map(String::as_str)
        .collect()
}

pub(crate) fn score_pair(
    viewer: &Profile,
    candidate: &Profile,
    weights: &MatchWeights,
) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    let shared_interests = shared_tags(&viewer.interests, &candidate.interests);
    if !shared_interests.is_empty() {
        let points =
            (shared_interests.len() as u32 * weights.interest_points).min(weights.interest_cap);
        let reason = if shared_interests.len() <= 3 {
            format!("Shared interests: {}", shared_interests.join(", "))
        } else {
            format!(
                "{} shared interests including {}",
                shared_interests.len(),
                shared_interests[..2].join(", ")
            )
        };
        components.push(ScoreComponent {
            factor: MatchFactor::SharedInterests,
            points,
            reason,
        });
    }

    if let (Some(ours), Some(theirs)) = (viewer.major.as_deref(), candidate.major.as_deref()) {
        if !ours.is_empty() && !theirs.is_empty() && ours.to_lowercase() == theirs.to_lowercase() {
            components.push(ScoreComponent {
                factor: MatchFactor::SameMajor,
                points: weights.major_points,
                reason: format!("Same major: {theirs}"),
            });
        }
    }

    if let (Some(ours), Some(theirs)) = (viewer.year, candidate.year) {
        if ours == theirs {
            components.push(ScoreComponent {
                factor: MatchFactor::SameYear,
                points: weights.year_points,
                reason: format!("Same year: {}", theirs.label()),
            });
        }
    }

    let shared_looking_for = shared_tags(&viewer.looking_for, &candidate.looking_for);
    if !shared_looking_for.is_empty() {
        let points =
            (shared_looking_for.len() as u32 * weights.looking_for_points).min(weights.looking_for_cap);
        components.push(ScoreComponent {
            factor: MatchFactor::LookingFor,
            points,
            // The full list, unlike the interests reason: looking-for sets
            // stay small enough to show whole.
            reason: format!("Both looking for: {}", shared_looking_for.join(", ")),
        });
    }

    if let (Some(ours), Some(theirs)) = (
        viewer.campus_area.as_deref(),
        candidate.campus_area.as_deref(),
    ) {
        if !ours.is_empty() && !theirs.is_empty() && ours == theirs {
            components.push(ScoreComponent {
                factor: MatchFactor::SameArea,
                points: weights.area_points,
                reason: format!("Same area: {theirs}"),
            });
        }
    }

    components
}
