//! Lead profile and conversation turn models.

mod model;

pub use model::{Profile, Tier, Turn, TurnRole};
