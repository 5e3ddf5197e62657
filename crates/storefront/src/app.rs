//! Router assembly.
//!
//! Shared by the binary and the integration tests, so both run the exact
//! same middleware stack. Only the session store differs.

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::from_fn,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::routes;
use crate::state::AppState;

/// Directory holding the stylesheet and other static assets.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Request span; `request_id` is filled in by the request ID middleware.
fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Build the full storefront router on top of the given session store.
pub fn build_router<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        // Listed outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(from_fn(request_id_middleware))
                .layer(session_layer),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
