//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password sign-up and login
//! - `catalog` - Product listing and default catalog seeding
//! - `orders` - Atomic order placement and order lookup
//! - `notes` - In-memory notes for the JSON API
//!
//! Services borrow their storage collaborators and are built per request;
//! they hold no state of their own except [`notes::NoteBook`].

pub mod auth;
pub mod catalog;
pub mod notes;
pub mod orders;

pub use auth::{AuthError, AuthService, SignUp};
pub use catalog::CatalogService;
pub use notes::{NoteBook, NoteIdsExhausted, NoteInput};
pub use orders::{OrderError, OrderRequest, OrderService};
