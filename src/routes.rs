//! REST endpoints for the intake assistant.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::engine::IntakeEngine;
use crate::store::ProfileStore;

/// Shared state for the intake routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<IntakeEngine>,
    pub store: Arc<dyn ProfileStore>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
}

/// GET /
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Intake Assist API is running."
    }))
}

/// POST /api/chat
///
/// Runs one intake turn and returns the reply. Store failures fail the
/// whole request; nothing from the turn is partially persisted.
async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.engine.handle(&body.user_id, &body.message).await {
        Ok(response) => {
            let reply = ChatResponse {
                response,
                user_id: body.user_id,
            };
            (StatusCode::OK, Json(serde_json::json!(reply)))
        }
        Err(e) => {
            tracing::error!(user_id = %body.user_id, "Turn failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to process message"})),
            )
        }
    }
}

/// GET /api/leads
///
/// Admin view of all lead profiles, highest score first.
async fn leads(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_profiles().await {
        Ok(profiles) => (StatusCode::OK, Json(serde_json::json!(profiles))),
        Err(e) => {
            tracing::error!("Failed to list leads: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to list leads"})),
            )
        }
    }
}

/// Build the intake REST routes.
pub fn api_routes(engine: Arc<IntakeEngine>, store: Arc<dyn ProfileStore>) -> Router {
    let state = AppState { engine, store };
    Router::new()
        .route("/", get(health))
        .route("/api/chat", post(chat))
        .route("/api/leads", get(leads))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
