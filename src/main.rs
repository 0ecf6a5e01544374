use std::sync::Arc;

use intake_assist::config::IntakeConfig;
use intake_assist::engine::IntakeEngine;
use intake_assist::llm::{LlmConfig, create_provider};
use intake_assist::rag::{KnowledgeBase, ProgramKnowledgeBase};
use intake_assist::routes::api_routes;
use intake_assist::store::{LibSqlBackend, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read API key from environment
    let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENROUTER_API_KEY not set");
        eprintln!("  export OPENROUTER_API_KEY=sk-or-...");
        std::process::exit(1);
    });

    let base_url = std::env::var("OPENROUTER_BASE_URL")
        .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string());
    let model =
        std::env::var("INTAKE_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

    let config = IntakeConfig::from_env();

    eprintln!("🤝 Intake Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", model);
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", config.port);
    eprintln!("   Leads API: http://0.0.0.0:{}/api/leads", config.port);

    // ── LLM provider ─────────────────────────────────────────────────────
    let llm_config = LlmConfig {
        api_key: secrecy::SecretString::from(api_key),
        base_url,
        model,
    };
    let llm = create_provider(&llm_config)?;

    // ── Knowledge base ───────────────────────────────────────────────────
    let knowledge_base: Arc<dyn KnowledgeBase> = Arc::new(
        ProgramKnowledgeBase::load(&config.knowledge_base_path, llm).unwrap_or_else(|e| {
            eprintln!(
                "Error: Failed to load knowledge corpus at {}: {}",
                config.knowledge_base_path.display(),
                e
            );
            std::process::exit(1);
        }),
    );
    eprintln!("   Corpus: {}", config.knowledge_base_path.display());

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn ProfileStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}\n", config.db_path.display());

    // ── Engine + HTTP server ─────────────────────────────────────────────
    let engine = Arc::new(IntakeEngine::new(
        Arc::clone(&store),
        knowledge_base,
        config.scheduling_link.clone(),
    ));

    let app = api_routes(engine, store);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Intake server started");
    axum::serve(listener, app).await?;

    Ok(())
}
