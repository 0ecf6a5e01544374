//! Response routing — composes the reply text for every turn.
//!
//! While fields are still being collected, the reply is the fixed prompt for
//! the step that follows the one just completed. Once the profile is scored,
//! every turn is routed by tier: qualified leads can book a call or ask the
//! knowledge base, potential leads always get knowledge base answers, and
//! unqualified leads get a fixed deflection and never reach the knowledge
//! base.

use std::sync::Arc;

use crate::profile::{Profile, Tier};
use crate::rag::KnowledgeBase;

use super::extract::Extraction;
use super::step::IntakeStep;
use super::templates;

/// Keywords that signal booking intent from a qualified lead.
const BOOKING_KEYWORDS: &[&str] = &["book", "schedule", "call"];

/// Picks the reply for each turn.
pub struct ResponseRouter {
    knowledge_base: Arc<dyn KnowledgeBase>,
    scheduling_link: String,
}

impl ResponseRouter {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>, scheduling_link: impl Into<String>) -> Self {
        Self {
            knowledge_base,
            scheduling_link: scheduling_link.into(),
        }
    }

    /// Compose the reply for a turn, given the step that was just handled
    /// and the extraction outcome. The profile carries any field, score, or
    /// tier updates the turn produced.
    pub async fn respond(
        &self,
        step: IntakeStep,
        outcome: Extraction,
        profile: &Profile,
        message: &str,
    ) -> String {
        match outcome {
            Extraction::Retry => templates::RETRY_EXPERIENCE.to_string(),
            Extraction::Completed => self.announcement(profile),
            Extraction::Advanced => match step {
                IntakeStep::Greeting => templates::GREETING.to_string(),
                IntakeStep::AwaitingRole => templates::ASK_EXPERIENCE.to_string(),
                IntakeStep::AwaitingExperience => templates::ASK_LOCATION.to_string(),
                IntakeStep::AwaitingLocation => templates::ASK_TEAM_LEADERSHIP.to_string(),
                IntakeStep::AwaitingTeamLeadership => templates::ASK_INTEREST.to_string(),
                // Interest answers complete the intake, so Advanced cannot
                // occur here; announce the tier all the same.
                IntakeStep::AwaitingInterest => self.announcement(profile),
                IntakeStep::PostQualification => self.steady_state(profile, message).await,
            },
        }
    }

    /// Reply for the turn that completed the intake and triggered scoring.
    fn announcement(&self, profile: &Profile) -> String {
        match profile.tier {
            Tier::Qualified => templates::qualified_announcement(
                profile.role.as_deref().unwrap_or("technology leader"),
                profile.years_experience.unwrap_or(0),
            ),
            Tier::Potential => templates::POTENTIAL_ANNOUNCEMENT.to_string(),
            Tier::NotQualified | Tier::Unknown => {
                templates::NOT_QUALIFIED_ANNOUNCEMENT.to_string()
            }
        }
    }

    /// Steady-state routing, re-evaluated independently on every turn after
    /// qualification. No field mutation happens here.
    async fn steady_state(&self, profile: &Profile, message: &str) -> String {
        match profile.tier {
            Tier::Qualified => {
                let lower = message.to_lowercase();
                if BOOKING_KEYWORDS.iter().any(|k| lower.contains(k)) {
                    templates::booking_instructions(&self.scheduling_link)
                } else {
                    self.ask_knowledge_base(profile.tier, message).await
                }
            }
            Tier::Potential => self.ask_knowledge_base(profile.tier, message).await,
            Tier::NotQualified | Tier::Unknown => templates::DEFLECTION.to_string(),
        }
    }

    /// Delegate to the knowledge base, converting any failure into the
    /// fixed fallback text.
    async fn ask_knowledge_base(&self, tier: Tier, message: &str) -> String {
        match self.knowledge_base.answer(tier, message).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Knowledge base lookup failed: {}", e);
                templates::KB_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::{LlmError, RagError};

    use super::*;

    /// Knowledge base double that counts calls and returns a canned answer
    /// or a failure.
    struct StubKb {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubKb {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KnowledgeBase for StubKb {
        async fn answer(&self, _tier: Tier, _message: &str) -> Result<String, RagError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RagError::Llm(LlmError::RequestFailed {
                    provider: "stub".to_string(),
                    reason: "boom".to_string(),
                }))
            } else {
                Ok("The program runs for twelve months.".to_string())
            }
        }
    }

    fn qualified_profile() -> Profile {
        let mut p = Profile::new("lead-1");
        p.role = Some("CIO".to_string());
        p.years_experience = Some(20);
        p.country = Some("UAE".to_string());
        p.leads_teams = Some(true);
        p.interest_level = Some("Consulting".to_string());
        p.score = 12;
        p.tier = Tier::Qualified;
        p
    }

    #[tokio::test]
    async fn collecting_steps_return_the_next_prompt() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let p = Profile::new("lead-1");

        let reply = router
            .respond(IntakeStep::Greeting, Extraction::Advanced, &p, "Hi")
            .await;
        assert_eq!(reply, templates::GREETING);

        let reply = router
            .respond(IntakeStep::AwaitingRole, Extraction::Advanced, &p, "CIO")
            .await;
        assert_eq!(reply, templates::ASK_EXPERIENCE);

        assert_eq!(kb.calls(), 0);
    }

    #[tokio::test]
    async fn retry_returns_the_same_reprompt_every_time() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb, "https://example.com/book");
        let p = Profile::new("lead-1");

        for _ in 0..2 {
            let reply = router
                .respond(
                    IntakeStep::AwaitingExperience,
                    Extraction::Retry,
                    &p,
                    "many",
                )
                .await;
            assert_eq!(reply, templates::RETRY_EXPERIENCE);
        }
    }

    #[tokio::test]
    async fn booking_intent_skips_the_knowledge_base() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let p = qualified_profile();

        let reply = router
            .respond(
                IntakeStep::PostQualification,
                Extraction::Advanced,
                &p,
                "I'd like to book a call",
            )
            .await;

        assert!(reply.contains("https://example.com/book"));
        assert_eq!(kb.calls(), 0);
    }

    #[tokio::test]
    async fn qualified_questions_go_to_the_knowledge_base() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let p = qualified_profile();

        let reply = router
            .respond(
                IntakeStep::PostQualification,
                Extraction::Advanced,
                &p,
                "How long does the program run?",
            )
            .await;

        assert_eq!(reply, "The program runs for twelve months.");
        assert_eq!(kb.calls(), 1);
    }

    #[tokio::test]
    async fn knowledge_base_failure_becomes_fallback_text() {
        let kb = StubKb::new(true);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let p = qualified_profile();

        let reply = router
            .respond(
                IntakeStep::PostQualification,
                Extraction::Advanced,
                &p,
                "What does membership cost?",
            )
            .await;

        assert_eq!(reply, templates::KB_FALLBACK);
        assert_eq!(kb.calls(), 1);
    }

    #[tokio::test]
    async fn potential_always_delegates() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let mut p = qualified_profile();
        p.score = 7;
        p.tier = Tier::Potential;

        // Booking words do not open a booking branch for this tier.
        let reply = router
            .respond(
                IntakeStep::PostQualification,
                Extraction::Advanced,
                &p,
                "Can I book a call?",
            )
            .await;

        assert_eq!(reply, "The program runs for twelve months.");
        assert_eq!(kb.calls(), 1);
    }

    #[tokio::test]
    async fn not_qualified_never_reaches_the_knowledge_base() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let mut p = qualified_profile();
        p.score = 3;
        p.tier = Tier::NotQualified;

        for message in ["tell me more", "can I book a call?", "please?"] {
            let reply = router
                .respond(
                    IntakeStep::PostQualification,
                    Extraction::Advanced,
                    &p,
                    message,
                )
                .await;
            assert_eq!(reply, templates::DEFLECTION);
        }
        assert_eq!(kb.calls(), 0);
    }

    #[tokio::test]
    async fn scoring_turn_announces_the_tier() {
        let kb = StubKb::new(false);
        let router = ResponseRouter::new(kb.clone(), "https://example.com/book");
        let p = qualified_profile();

        let reply = router
            .respond(
                IntakeStep::AwaitingInterest,
                Extraction::Completed,
                &p,
                "Consulting",
            )
            .await;

        assert!(reply.contains("excellent match"));
        assert!(reply.contains("CIO"));
        // The announcement is a fixed template, not a knowledge base answer.
        assert_eq!(kb.calls(), 0);
    }
}
