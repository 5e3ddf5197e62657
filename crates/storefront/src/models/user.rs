//! User domain types.

use chrono::{DateTime, Utc};

use market_core::{Email, UserId, Username};

/// A registered user (domain type).
///
/// The password hash is deliberately not part of this type; it is only read
/// by the login path through `UserStore::get_password_hash`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique display name.
    pub username: Username,
    /// Unique, normalized email address.
    pub email: Email,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
}
