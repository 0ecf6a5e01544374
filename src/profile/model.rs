//! Data models for lead profiles and their turn logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Qualification outcome for a lead.
///
/// `Unknown` until the intake completes and the profile is scored; the tier
/// is computed exactly once and never recomputed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Unknown,
    Qualified,
    Potential,
    NotQualified,
}

impl Default for Tier {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Qualified => "qualified",
            Self::Potential => "potential",
            Self::NotQualified => "not_qualified",
        };
        write!(f, "{s}")
    }
}

/// Persisted per-identifier lead record.
///
/// Intake fields are populated strictly in the order role → years_experience
/// → country → leads_teams → interest_level; once a downstream field is set,
/// no upstream field is ever rewritten. `leads_teams` is deliberately a
/// tri-state `Option<bool>` — "unset" must stay distinguishable from "no",
/// or step inference breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    /// Free-text location, city and country conflated by design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leads_teams: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_level: Option<String>,
    pub score: i64,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile for a newly seen identifier, all intake fields unset.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: None,
            years_experience: None,
            country: None,
            leads_teams: None,
            interest_level: None,
            score: 0,
            tier: Tier::Unknown,
            created_at: Utc::now(),
        }
    }

    /// Whether every intake field has been captured.
    pub fn is_complete(&self) -> bool {
        self.role.is_some()
            && self.years_experience.is_some()
            && self.country.is_some()
            && self.leads_teams.is_some()
            && self.interest_level.is_some()
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One logged message in a profile's append-only conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
