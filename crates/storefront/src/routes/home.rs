//! Root and health check handlers.

use axum::{extract::State, http::StatusCode, response::Redirect};

use crate::middleware::OptionalAuth;
use crate::middleware::auth::LOGIN_PATH;
use crate::state::AppState;

/// Send logged-in users to the catalog and everyone else to the login page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/products")
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.storage().ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
