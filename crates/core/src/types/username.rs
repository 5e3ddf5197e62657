//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// Shorter than [`Username::MIN_LENGTH`] characters.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Longer than [`Username::MAX_LENGTH`] characters.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Contains control characters.
    #[error("username cannot contain control characters")]
    InvalidCharacter,
}

/// A display name chosen at sign-up. Unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a username, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the trimmed input is too short, too
    /// long, or contains control characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_control) {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("  jin ").unwrap().as_str(), "jin");
    }

    #[test]
    fn test_min_length_counts_characters() {
        assert!(matches!(
            Username::parse("a"),
            Err(UsernameError::TooShort { min: 2 })
        ));
        // Two multi-byte characters are still two characters
        assert!(Username::parse("영빈").is_ok());
    }

    #[test]
    fn test_max_length() {
        assert!(Username::parse(&"x".repeat(50)).is_ok());
        assert!(matches!(
            Username::parse(&"x".repeat(51)),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_rejects_control_characters() {
        assert_eq!(
            Username::parse("ab\u{0007}c"),
            Err(UsernameError::InvalidCharacter)
        );
    }
}
