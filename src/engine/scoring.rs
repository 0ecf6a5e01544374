//! Lead scoring and qualification tiers.
//!
//! Scoring is a pure function of the profile, computed from independent
//! additive factors with no interaction terms. It runs exactly once, the
//! moment the final intake field is captured.

use crate::profile::{Profile, Tier};

/// Highest attainable score across all factors.
pub const MAX_SCORE: i64 = 12;

/// Senior titles worth +3. Checked before the mid set; first match wins.
const SENIOR_TITLES: &[&str] = &[
    "cio",
    "cto",
    "ciso",
    "director",
    "head",
    "vp",
    "president",
    "chief",
];

/// Mid-level titles worth +2.
const MID_TITLES: &[&str] = &["manager", "lead", "architect"];

/// Interest keywords that align with the program, worth +2.
const INTEREST_KEYWORDS: &[&str] = &["consulting", "mentorship", "community", "leadership"];

/// Score a profile.
///
/// Deterministic and total: unset fields simply contribute zero.
pub fn score_profile(profile: &Profile) -> i64 {
    let mut score = 0;

    let role = profile.role.as_deref().unwrap_or("").to_lowercase();
    if SENIOR_TITLES.iter().any(|t| role.contains(t)) {
        score += 3;
    } else if MID_TITLES.iter().any(|t| role.contains(t)) {
        score += 2;
    }

    score += match profile.years_experience {
        Some(years) if years >= 15 => 3,
        Some(years) if years >= 10 => 2,
        Some(years) if years >= 5 => 1,
        _ => 0,
    };

    if profile.leads_teams == Some(true) {
        score += 2;
    }

    if profile.country.as_deref().is_some_and(|c| !c.is_empty()) {
        score += 2;
    }

    let interest = profile.interest_level.as_deref().unwrap_or("").to_lowercase();
    if INTEREST_KEYWORDS.iter().any(|k| interest.contains(k)) {
        score += 2;
    }

    score
}

/// Map a score to its qualification tier.
pub fn classify(score: i64) -> Tier {
    if score >= 9 {
        Tier::Qualified
    } else if score >= 5 {
        Tier::Potential
    } else {
        Tier::NotQualified
    }
}
