use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use super::AppState;
use crate::error::GenerateError;
use crate::models::{GenerateBody, GenerationResult};

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: &'static str,
    uptime_seconds: u64,
    gemini_configured: bool,
    news_configured: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        gemini_configured: state.chat.gemini_configured(),
        news_configured: state.chat.news_configured(),
    })
}

/// POST /api/generate: answer a prompt, with news citations when relevant
async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerationResult>, GenerateError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection);
        GenerateError::InvalidRequest(rejection.body_text())
    })?;

    let result = state.chat.handle(body).await?;
    Ok(Json(result))
}
