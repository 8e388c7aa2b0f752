//! Bearer-token guard for the admin routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use eventica_core::EventicaError;

use crate::routes::AppError;
use crate::state::AppState;

/// Reject the request unless it carries the configured admin token.
/// Without a configured token every request passes.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.admin_token.as_deref() {
        let presented = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        if presented != Some(expected) {
            tracing::warn!(uri = %request.uri(), "rejected request without valid admin token");
            return Err(EventicaError::Unauthorized.into());
        }
    }

    Ok(next.run(request).await)
}
