//! IntakeEngine — coordinates step inference, extraction, scoring, and
//! response routing for one turn at a time.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::profile::Tier;
use crate::rag::KnowledgeBase;
use crate::store::ProfileStore;

use super::extract::{Extraction, FieldExtractor};
use super::router::ResponseRouter;
use super::scoring::{classify, score_profile};
use super::step::infer_step;

/// The conversation engine. One instance serves every profile; turns for
/// the same profile are serialized, turns for distinct profiles run
/// concurrently with no shared mutable state between them.
pub struct IntakeEngine {
    store: Arc<dyn ProfileStore>,
    extractor: FieldExtractor,
    router: ResponseRouter,
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IntakeEngine {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        scheduling_link: impl Into<String>,
    ) -> Self {
        Self {
            store,
            extractor: FieldExtractor::new(),
            router: ResponseRouter::new(knowledge_base, scheduling_link),
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound message for a profile and return the reply text.
    ///
    /// The turn's field write, one-time score computation, and both turn-log
    /// entries are committed together or not at all; a store failure fails
    /// the whole turn.
    pub async fn handle(&self, profile_id: &str, message: &str) -> Result<String> {
        // At most one in-flight mutation per identifier. Two simultaneous
        // messages observing the same unset field would otherwise both
        // claim the same step.
        let lock = self.turn_lock(profile_id).await;
        let _turn = lock.lock().await;

        let mut profile = match self.store.get(profile_id).await? {
            Some(profile) => profile,
            None => {
                tracing::info!(profile_id, "New lead profile");
                self.store.create(profile_id).await?
            }
        };

        // The incoming message counts toward the log before inference, so
        // the very first message lands on Greeting.
        let logged_turns = self.store.turn_count(profile_id).await? + 1;
        let step = infer_step(&profile, logged_turns);
        let outcome = self.extractor.apply(step, &mut profile, message);

        // Scoring runs exactly once, the instant the last field is set.
        if outcome == Extraction::Completed && profile.tier == Tier::Unknown {
            profile.score = score_profile(&profile);
            profile.tier = classify(profile.score);
            tracing::info!(
                profile_id,
                score = profile.score,
                tier = %profile.tier,
                "Lead scored"
            );
        }

        let reply = self.router.respond(step, outcome, &profile, message).await;

        self.store.commit_turn(&profile, message, &reply).await?;
        tracing::debug!(profile_id, step = %step, "Turn committed");

        Ok(reply)
    }

    async fn turn_lock(&self, profile_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks
            .entry(profile_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// End-to-end coverage for IntakeEngine lives in tests/intake_flow.rs, which
// drives full conversations against an in-memory store and a stub knowledge
// base. The pure pieces are tested in their own modules.
