//! Banner and health endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use eventica_core::store::EventStore;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/api/v1/event/health", get(health))
}

/// GET / - Plain-text banner
async fn banner() -> &'static str {
    "Eventica API server"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// GET /api/v1/event/health - Store reachability and event count
async fn health(State(state): State<AppState>) -> Response {
    let backend = state.service.store().name();
    let timestamp = Utc::now().to_rfc3339();

    match state.blocking(|service| service.count()).await {
        Ok(count) => Json(HealthResponse {
            status: "healthy",
            database: "connected",
            backend,
            event_count: Some(count),
            error: None,
            timestamp,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    backend,
                    event_count: None,
                    error: Some(e.to_string()),
                    timestamp,
                }),
            )
                .into_response()
        }
    }
}
