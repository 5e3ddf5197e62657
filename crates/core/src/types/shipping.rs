//! Shipping information captured with an order.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The individual fields of a shipping address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    Address,
    City,
    PostalCode,
    Country,
}

impl ShippingField {
    /// Human-readable label used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postal code",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for ShippingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur when building [`ShippingInfo`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShippingError {
    /// One or more required fields were blank.
    #[error("missing shipping {}", join_labels(.0))]
    MissingFields(Vec<ShippingField>),
    /// A field exceeded [`ShippingInfo::MAX_FIELD_LENGTH`].
    #[error("shipping {0} is too long")]
    TooLong(ShippingField),
}

fn join_labels(fields: &[ShippingField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete shipping address. Every field is present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    address: String,
    city: String,
    postal_code: String,
    country: String,
}

impl ShippingInfo {
    /// Maximum length of any single field, in characters.
    pub const MAX_FIELD_LENGTH: usize = 200;

    /// Build shipping info from raw form values.
    ///
    /// Values are trimmed. All blank fields are reported together so the
    /// form can point at every missing input at once.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::MissingFields`] listing every blank field, or
    /// [`ShippingError::TooLong`] for the first oversized field.
    pub fn parse(
        address: &str,
        city: &str,
        postal_code: &str,
        country: &str,
    ) -> Result<Self, ShippingError> {
        let values = [
            (ShippingField::Address, address.trim()),
            (ShippingField::City, city.trim()),
            (ShippingField::PostalCode, postal_code.trim()),
            (ShippingField::Country, country.trim()),
        ];

        let missing: Vec<ShippingField> = values
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ShippingError::MissingFields(missing));
        }

        if let Some((field, _)) = values
            .iter()
            .find(|(_, value)| value.chars().count() > Self::MAX_FIELD_LENGTH)
        {
            return Err(ShippingError::TooLong(*field));
        }

        let [address, city, postal_code, country] = values.map(|(_, value)| value.to_owned());
        Ok(Self {
            address,
            city,
            postal_code,
            country,
        })
    }

    /// Street address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Postal code.
    #[must_use]
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Country.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}
