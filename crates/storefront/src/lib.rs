//! Market storefront library.
//!
//! A small server-rendered store behind a session login gate: sign-up and
//! login, a product catalog, stock-checked order placement and a dashboard
//! of recent orders. It also serves an in-memory notes JSON API.
//!
//! Storage is either `PostgreSQL` (via sqlx) or an in-process memory backend;
//! see [`db::Storage`]. The router is built by [`app::build_router`] so the
//! binary and the integration tests share one middleware stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
