//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /products or /login
//! GET  /health                    - Health check
//! GET  /health/ready              - Readiness check (storage ping)
//!
//! # Auth
//! GET  /signup                    - Sign-up page
//! POST /signup                    - Sign-up action
//! GET  /login                     - Login page
//! POST /login                     - Login action
//! GET  /logout, POST /logout      - Logout action
//!
//! # Notes API (JSON, no login required)
//! GET/POST       /api/notes
//! GET/PUT/DELETE /api/notes/{id}
//!
//! # Login required
//! GET  /dashboard                 - User info and recent orders
//! GET  /api/user                  - Current user (JSON)
//! GET  /products                  - Product listing
//! GET  /products/{id}             - Product detail
//! GET  /order/{id}                - Order form
//! POST /order/{id}                - Place order
//! GET  /order-confirmation/{id}   - Order confirmation
//! ```

pub mod account;
pub mod auth;
pub mod home;
pub mod notes;
pub mod orders;
pub mod products;

use axum::{Router, middleware::from_fn, routing::get};

use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the notes API router.
pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list).post(notes::create))
        .route(
            "/{id}",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
}

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .route("/health/ready", get(home::readiness))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .nest("/api/notes", note_routes())
}

/// Routes behind the login gate.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(account::dashboard))
        .route("/api/user", get(account::current_user))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/order/{id}", get(orders::new).post(orders::create))
        .route("/order-confirmation/{id}", get(orders::confirmation))
        .route_layer(from_fn(require_auth))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
}
