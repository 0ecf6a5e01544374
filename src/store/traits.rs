//! `ProfileStore` trait — async persistence interface for lead profiles and
//! their turn logs.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::profile::{Profile, Turn, TurnRole};

/// Backend-agnostic store for profiles and their append-only turn logs.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile, or `None` for an unknown identifier.
    async fn get(&self, id: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Create a fresh profile with every intake field unset and tier
    /// `Unknown`.
    async fn create(&self, id: &str) -> Result<Profile, DatabaseError>;

    /// Persist the profile's current field values, score, and tier.
    async fn save(&self, profile: &Profile) -> Result<(), DatabaseError>;

    /// Append one turn to the profile's ordered log.
    async fn append_turn(
        &self,
        id: &str,
        role: TurnRole,
        content: &str,
    ) -> Result<(), DatabaseError>;

    /// Number of logged turns for a profile.
    async fn turn_count(&self, id: &str) -> Result<usize, DatabaseError>;

    /// Full turn log, oldest first.
    async fn list_turns(&self, id: &str) -> Result<Vec<Turn>, DatabaseError>;

    /// All profiles, highest score first.
    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;

    /// Commit one completed turn: the inbound user message, the profile's
    /// updated fields, and the assistant reply, together or not at all.
    ///
    /// The default implementation runs the three writes sequentially;
    /// backends that can should override it with a real transaction.
    async fn commit_turn(
        &self,
        profile: &Profile,
        user_message: &str,
        reply: &str,
    ) -> Result<(), DatabaseError> {
        self.append_turn(&profile.id, TurnRole::User, user_message)
            .await?;
        self.save(profile).await?;
        self.append_turn(&profile.id, TurnRole::Assistant, reply)
            .await
    }
}
