//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-up and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required form fields were blank.
    #[error("please fill in every field")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Username failed validation.
    #[error("{0}")]
    InvalidUsername(#[from] market_core::UsernameError),

    /// Invalid email format.
    #[error("{0}")]
    InvalidEmail(#[from] market_core::EmailError),

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Email or username is already registered.
    #[error("a user with that email or username already exists")]
    UserAlreadyExists,

    /// Invalid credentials (wrong password or user not found).
    #[error("email or password is incorrect")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether the user can fix this by correcting the form.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::PasswordHash | Self::Repository(_))
    }

    /// Message safe to show on the form.
    #[must_use]
    pub fn form_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            "Something went wrong. Please try again.".to_owned()
        }
    }
}
