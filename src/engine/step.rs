//! Intake step inference — derives the dialogue position from field nullness.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Position in the fixed intake sequence.
///
/// Never stored; always re-derived from which profile fields are populated,
/// so a persisted profile can never disagree with its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    Greeting,
    AwaitingRole,
    AwaitingExperience,
    AwaitingLocation,
    AwaitingTeamLeadership,
    AwaitingInterest,
    PostQualification,
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::AwaitingRole => "awaiting_role",
            Self::AwaitingExperience => "awaiting_experience",
            Self::AwaitingLocation => "awaiting_location",
            Self::AwaitingTeamLeadership => "awaiting_team_leadership",
            Self::AwaitingInterest => "awaiting_interest",
            Self::PostQualification => "post_qualification",
        };
        write!(f, "{s}")
    }
}

/// Derive the current step: the first unset field in the fixed order role →
/// experience → location → team leadership → interest, or
/// `PostQualification` once all five are set.
///
/// `logged_turns` counts the turn log including the message being handled.
/// A profile with no role and at most one logged turn is still in
/// `Greeting`: the opening message is logged but never consumed as a job
/// title, so a user's "Hi" cannot become their role.
pub fn infer_step(profile: &Profile, logged_turns: usize) -> IntakeStep {
    if profile.role.is_none() {
        if logged_turns <= 1 {
            IntakeStep::Greeting
        } else {
            IntakeStep::AwaitingRole
        }
    } else if profile.years_experience.is_none() {
        IntakeStep::AwaitingExperience
    } else if profile.country.is_none() {
        IntakeStep::AwaitingLocation
    } else if profile.leads_teams.is_none() {
        IntakeStep::AwaitingTeamLeadership
    } else if profile.interest_level.is_none() {
        IntakeStep::AwaitingInterest
    } else {
        IntakeStep::PostQualification
    }
}
