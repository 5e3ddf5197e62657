//! Order quantity type.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// No quantity was submitted.
    #[error("quantity is required")]
    Missing,
    /// The submitted value is not a whole number.
    #[error("quantity must be a whole number")]
    NotANumber,
    /// Zero or negative quantities cannot be ordered.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// Larger than any stock count the store can hold.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
        /// The requested count, saturated at `u64::MAX`.
        requested: u64,
    },
}

/// A positive number of units.
///
/// The upper bound matches the `INTEGER` stock column, so a quantity can
/// always be compared against and subtracted from a stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest orderable quantity (`i32::MAX`).
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Create a quantity from a number of units.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero and
    /// [`QuantityError::TooLarge`] above [`Quantity::MAX`].
    pub fn new(units: u32) -> Result<Self, QuantityError> {
        if units > Self::MAX {
            return Err(QuantityError::TooLarge {
                max: Self::MAX,
                requested: u64::from(units),
            });
        }
        NonZeroU32::new(units)
            .map(Self)
            .ok_or(QuantityError::NotPositive)
    }

    /// Parse a quantity from a raw form value.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] for blank, non-numeric, non-positive or
    /// oversized input. Any run of digits is a number, however long, so an
    /// oversized count is always `TooLarge` and never `NotANumber`.
    pub fn parse(raw: &str) -> Result<Self, QuantityError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(QuantityError::Missing);
        }
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QuantityError::NotANumber);
        }
        if negative || digits.bytes().all(|b| b == b'0') {
            return Err(QuantityError::NotPositive);
        }
        // Only overflow can fail here
        let units = digits.parse::<u64>().unwrap_or(u64::MAX);
        let units = u32::try_from(units).map_err(|_| QuantityError::TooLarge {
            max: Self::MAX,
            requested: units,
        })?;
        Self::new(units)
    }

    /// Number of units.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Quantity::parse("5").unwrap().get(), 5);
        assert_eq!(Quantity::parse(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn test_parse_missing() {
        assert_eq!(Quantity::parse(""), Err(QuantityError::Missing));
        assert_eq!(Quantity::parse("  "), Err(QuantityError::Missing));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Quantity::parse("five"), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("1.5"), Err(QuantityError::NotANumber));
    }

    #[test]
    fn test_parse_non_positive() {
        assert_eq!(Quantity::parse("0"), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse("-3"), Err(QuantityError::NotPositive));
    }

    #[test]
    fn test_parse_signs() {
        assert_eq!(Quantity::parse("+7").unwrap().get(), 7);
        assert_eq!(Quantity::parse("-0"), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse("000"), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::parse("-"), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("+-1"), Err(QuantityError::NotANumber));
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(
            Quantity::parse("3000000000"),
            Err(QuantityError::TooLarge {
                max: Quantity::MAX,
                requested: 3_000_000_000,
            })
        );
        assert_eq!(
            Quantity::parse("2147483648"),
            Err(QuantityError::TooLarge {
                max: Quantity::MAX,
                requested: 2_147_483_648,
            })
        );
        assert_eq!(Quantity::parse("2147483647").unwrap().get(), Quantity::MAX);
        assert!(matches!(
            Quantity::new(u32::MAX),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_parse_digits_beyond_u64_are_too_large() {
        assert_eq!(
            Quantity::parse("99999999999999999999"),
            Err(QuantityError::TooLarge {
                max: Quantity::MAX,
                requested: u64::MAX,
            })
        );
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
    }
}
