//! Configuration types.

use std::path::PathBuf;

/// Intake assistant configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// External scheduling link handed to qualified leads with booking
    /// intent.
    pub scheduling_link: String,
    /// Plain-text Q&A corpus for the knowledge base.
    pub knowledge_base_path: PathBuf,
    /// Local libSQL database file.
    pub db_path: PathBuf,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            scheduling_link: "https://calendly.com/zoc-ambassador/interview".to_string(),
            knowledge_base_path: PathBuf::from("./qa_data.txt"),
            db_path: PathBuf::from("./data/intake.db"),
            port: 8000,
        }
    }
}

impl IntakeConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scheduling_link: std::env::var("INTAKE_SCHEDULING_LINK")
                .unwrap_or(defaults.scheduling_link),
            knowledge_base_path: std::env::var("INTAKE_KB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.knowledge_base_path),
            db_path: std::env::var("INTAKE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            port: std::env::var("INTAKE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}
