pub mod events;
pub mod health;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventica_core::EventicaError;
use eventica_core::config::EventicaConfig;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full API with state and the production layers applied.
pub fn app(state: AppState, config: &EventicaConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .merge(events::router(&state, config.migrate_body_limit_bytes))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Convert errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<EventicaError>() {
            Some(EventicaError::Validation(_)) | Some(EventicaError::MalformedDate(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(EventicaError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(EventicaError::Unauthorized) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0.downcast_ref::<EventicaError>() {
            Some(EventicaError::NotFound(_)) => ErrorResponse {
                message: "Event not found.".to_string(),
                error: None,
            },
            _ if status.is_server_error() => {
                tracing::error!(error = %self.0, "request failed");
                ErrorResponse {
                    message: "Server Error".to_string(),
                    error: Some(self.0.to_string()),
                }
            }
            _ => ErrorResponse {
                message: self.0.to_string(),
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
