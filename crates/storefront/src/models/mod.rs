//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Every field has already passed through the parsers in
//! `market_core`, so handlers and templates never re-validate them.

pub mod note;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use note::Note;
pub use order::{LineItem, NewOrder, Order};
pub use product::{NewProduct, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, User};
