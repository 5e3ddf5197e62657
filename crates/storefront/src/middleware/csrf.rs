//! Per-session CSRF tokens for HTML forms.
//!
//! Every form that changes state carries a hidden `csrf_token` field. The
//! token is 256 random bits, base64-encoded, generated on first use and kept
//! in the session. A POST whose token does not match gets a 403.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// The session's CSRF token, for rendering into forms.
#[derive(Clone, Debug)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the token value for use in templates.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Get the session's token, creating one if the session has none yet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session store fails.
    pub async fn for_session(session: &Session) -> Result<Self, AppError> {
        if let Some(token) = session
            .get::<String>(session_keys::CSRF_TOKEN)
            .await
            .map_err(session_error)?
        {
            return Ok(Self(token));
        }

        let token = Self::generate();
        session
            .insert(session_keys::CSRF_TOKEN, &token.0)
            .await
            .map_err(session_error)?;
        Ok(token)
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;
        Self::for_session(session).await
    }
}

/// Check a submitted form token against the session's.
///
/// # Errors
///
/// Returns `AppError::Forbidden` if the session has no token or it differs.
pub async fn verify_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let expected = session
        .get::<String>(session_keys::CSRF_TOKEN)
        .await
        .map_err(session_error)?;

    match expected {
        Some(expected) if constant_time_eq(expected.as_bytes(), submitted.as_bytes()) => Ok(()),
        _ => {
            tracing::warn!("CSRF token mismatch");
            Err(AppError::Forbidden("invalid CSRF token".to_string()))
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub(crate) fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_differ() {
        let a = CsrfToken::generate();
        let b = CsrfToken::generate();
        assert_ne!(a.value(), b.value());
        assert_eq!(a.value().len(), 43);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"", b"a"));
    }
}
