//! Market Core - Shared domain types.
//!
//! This crate provides the value types used across the Market components:
//! - `storefront` - Web store, login gate and notes API
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Parsing a raw form value into one of these types is the
//! only way to construct it, so downstream code can rely on the invariants.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, usernames, prices, quantities and shipping info

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
