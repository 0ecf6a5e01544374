//! Conversation engine — state inference, field extraction, scoring, and
//! response routing.

pub mod extract;
pub mod manager;
pub mod router;
pub mod scoring;
pub mod step;
pub mod templates;

pub use extract::{Extraction, FieldExtractor};
pub use manager::IntakeEngine;
pub use router::ResponseRouter;
pub use scoring::{MAX_SCORE, classify, score_profile};
pub use step::{IntakeStep, infer_step};
