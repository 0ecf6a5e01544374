//! Intake Assist — lead qualification dialogue core.

pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod profile;
pub mod rag;
pub mod routes;
pub mod store;
