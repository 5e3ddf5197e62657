//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//! 4. Session layer (tower-sessions, `PostgreSQL` or memory store)
//! 5. Login gate ([`require_auth`], protected routes only)
//!
//! CSRF checks run inside the form handlers, since they need the parsed body.

pub mod auth;
pub mod csrf;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, require_auth, set_current_user,
};
pub use csrf::{CsrfToken, verify_csrf};
pub use request_id::{RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
