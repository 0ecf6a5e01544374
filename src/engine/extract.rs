//! Field extraction — parses one free-text answer into the current step's
//! field.

use regex::Regex;

use crate::profile::Profile;

use super::step::IntakeStep;

/// Tokens that count as a "yes" to the team-leadership question.
const AFFIRMATIVE: &[&str] = &["yes", "yup"];
/// Tokens that count as a "no".
const NEGATIVE: &[&str] = &["no", "nope"];

/// Outcome of applying one message to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The step's field was written (or the step has no field to fill).
    Advanced,
    /// The answer could not be parsed; re-prompt without mutating anything.
    Retry,
    /// `interest_level` was just written; scoring must run before replying.
    Completed,
}

/// Parses answers according to the current intake step.
///
/// Only ever writes the single field implied by the step, so fields upstream
/// of an already-answered question cannot be rewritten.
pub struct FieldExtractor {
    digits: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").expect("digit pattern is valid"),
        }
    }

    /// Apply `message` to the field implied by `step`.
    pub fn apply(&self, step: IntakeStep, profile: &mut Profile, message: &str) -> Extraction {
        match step {
            // Greeting consumes nothing, and after qualification there are
            // no fields left to fill.
            IntakeStep::Greeting | IntakeStep::PostQualification => Extraction::Advanced,

            IntakeStep::AwaitingRole => {
                profile.role = Some(message.trim().to_string());
                Extraction::Advanced
            }

            IntakeStep::AwaitingExperience => {
                // First run of digits anywhere in the message, so "20 years"
                // and "about 20" both parse.
                match self
                    .digits
                    .find(message)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                {
                    Some(years) => {
                        profile.years_experience = Some(years);
                        Extraction::Advanced
                    }
                    None => Extraction::Retry,
                }
            }

            IntakeStep::AwaitingLocation => {
                profile.country = Some(message.trim().to_string());
                Extraction::Advanced
            }

            IntakeStep::AwaitingTeamLeadership => {
                let lower = message.to_lowercase();
                let affirmative = AFFIRMATIVE.iter().any(|t| lower.contains(t));
                let negative = NEGATIVE.iter().any(|t| lower.contains(t));
                let verdict = match (affirmative, negative) {
                    // "yes" wins even when both appear.
                    (true, _) => true,
                    (false, true) => false,
                    // Ambiguous answers silently resolve to false; this
                    // step never re-prompts.
                    (false, false) => false,
                };
                profile.leads_teams = Some(verdict);
                Extraction::Advanced
            }

            IntakeStep::AwaitingInterest => {
                profile.interest_level = Some(message.trim().to_string());
                Extraction::Completed
            }
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new()
    }

    #[test]
    fn greeting_extracts_nothing() {
        let mut p = Profile::new("lead-1");
        let outcome = extractor().apply(IntakeStep::Greeting, &mut p, "Hi there!");
        assert_eq!(outcome, Extraction::Advanced);
        assert!(p.role.is_none());
    }

    #[test]
    fn role_is_taken_verbatim() {
        let mut p = Profile::new("lead-1");
        let outcome = extractor().apply(IntakeStep::AwaitingRole, &mut p, "  I am a CIO  ");
        assert_eq!(outcome, Extraction::Advanced);
        assert_eq!(p.role.as_deref(), Some("I am a CIO"));
    }

    #[test]
    fn experience_takes_first_digit_run() {
        let mut p = Profile::new("lead-1");
        let outcome = extractor().apply(
            IntakeStep::AwaitingExperience,
            &mut p,
            "around 20 years, 5 of them remote",
        );
        assert_eq!(outcome, Extraction::Advanced);
        assert_eq!(p.years_experience, Some(20));
    }

    #[test]
    fn experience_without_digits_retries_without_mutation() {
        let mut p = Profile::new("lead-1");
        for _ in 0..3 {
            let outcome =
                extractor().apply(IntakeStep::AwaitingExperience, &mut p, "quite a few years");
            assert_eq!(outcome, Extraction::Retry);
            assert!(p.years_experience.is_none());
        }
    }

    #[test]
    fn location_is_taken_verbatim() {
        let mut p = Profile::new("lead-1");
        extractor().apply(IntakeStep::AwaitingLocation, &mut p, "Dubai, UAE");
        assert_eq!(p.country.as_deref(), Some("Dubai, UAE"));
    }

    #[test]
    fn team_leadership_yes_variants() {
        for answer in ["Yes", "yes, I do", "Yup!", "YES absolutely"] {
            let mut p = Profile::new("lead-1");
            let outcome = extractor().apply(IntakeStep::AwaitingTeamLeadership, &mut p, answer);
            assert_eq!(outcome, Extraction::Advanced);
            assert_eq!(p.leads_teams, Some(true), "answer: {answer}");
        }
    }

    #[test]
    fn team_leadership_no_variants() {
        for answer in ["No", "nope", "Not really, no"] {
            let mut p = Profile::new("lead-1");
            extractor().apply(IntakeStep::AwaitingTeamLeadership, &mut p, answer);
            assert_eq!(p.leads_teams, Some(false), "answer: {answer}");
        }
    }

    #[test]
    fn team_leadership_ambiguous_defaults_to_false() {
        let mut p = Profile::new("lead-1");
        let outcome = extractor().apply(IntakeStep::AwaitingTeamLeadership, &mut p, "maybe");
        // Still advances: this step never asks again.
        assert_eq!(outcome, Extraction::Advanced);
        assert_eq!(p.leads_teams, Some(false));
    }

    #[test]
    fn interest_completes_the_intake() {
        let mut p = Profile::new("lead-1");
        let outcome = extractor().apply(IntakeStep::AwaitingInterest, &mut p, "Consulting");
        assert_eq!(outcome, Extraction::Completed);
        assert_eq!(p.interest_level.as_deref(), Some("Consulting"));
    }

    #[test]
    fn post_qualification_never_mutates() {
        let mut p = Profile::new("lead-1");
        p.role = Some("CTO".to_string());
        p.years_experience = Some(15);
        p.country = Some("Dubai".to_string());
        p.leads_teams = Some(true);
        p.interest_level = Some("Consulting".to_string());
        let before = p.clone();

        extractor().apply(IntakeStep::PostQualification, &mut p, "tell me more");

        assert_eq!(p.role, before.role);
        assert_eq!(p.years_experience, before.years_experience);
        assert_eq!(p.country, before.country);
        assert_eq!(p.leads_teams, before.leads_teams);
        assert_eq!(p.interest_level, before.interest_level);
    }
}
