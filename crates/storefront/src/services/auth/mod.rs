//! Authentication service.
//!
//! Password sign-up and login over a [`UserStore`]. Session handling lives in
//! `middleware::auth`; this module only decides who the user is.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument};

use market_core::{Email, Username};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Raw sign-up form input.
#[derive(Debug, Clone, Copy)]
pub struct SignUp<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank.
    /// Returns `AuthError::PasswordMismatch` if the confirmation differs.
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` on bad input.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email or username is taken.
    #[instrument(skip(self, form), fields(username = %form.username.trim()))]
    pub async fn sign_up(&self, form: SignUp<'_>) -> Result<User, AuthError> {
        if [form.username, form.email, form.password, form.confirm_password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AuthError::MissingFields);
        }

        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let username = Username::parse(form.username)?;
        let email = Email::parse(form.email)?;
        validate_password(form.password)?;

        let password_hash = hash_password(form.password)?;

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[instrument(skip(self, email, password))]
    pub async fn log_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        // A malformed address cannot belong to anyone
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
