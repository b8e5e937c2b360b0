//! Value objects composing a member profile.
//!
//! # Responsibility
//! - Wrap primitive strings in typed, immutable values.
//! - Reject blank or malformed input at construction.
//!
//! # Invariants
//! - Values are never mutated after construction; equality is structural.
//! - Deserialization goes through the same validation as the constructors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern must compile"));

/// Validation failures for member and value-object construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    /// Username is empty or whitespace only.
    EmptyUsername,
    /// A required text field is empty or whitespace only.
    EmptyField(&'static str),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for MemberValidationError {}

/// Postal address of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressFields")]
pub struct Address {
    country: String,
    province: String,
    city: String,
    postal_code: String,
}

#[derive(Deserialize)]
struct AddressFields {
    country: String,
    province: String,
    city: String,
    postal_code: String,
}

impl Address {
    /// Builds an address. `country` and `city` are required; `province` and
    /// `postal_code` may be empty for regions that do not use them.
    pub fn new(
        country: impl Into<String>,
        province: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Result<Self, MemberValidationError> {
        let country = required(country.into(), "address.country")?;
        let city = required(city.into(), "address.city")?;
        Ok(Self {
            country,
            province: province.into(),
            city,
            postal_code: postal_code.into(),
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

impl TryFrom<AddressFields> for Address {
    type Error = MemberValidationError;

    fn try_from(value: AddressFields) -> Result<Self, Self::Error> {
        Self::new(value.country, value.province, value.city, value.postal_code)
    }
}

/// Free-form height text, e.g. `5' 11"` or `180cm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Height(String);

impl Height {
    pub fn new(value: impl Into<String>) -> Result<Self, MemberValidationError> {
        required(value.into(), "height").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form weight text, e.g. `180lb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Weight(String);

impl Weight {
    pub fn new(value: impl Into<String>) -> Result<Self, MemberValidationError> {
        required(value.into(), "weight").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, MemberValidationError> {
        let value = value.into();
        if !EMAIL_PATTERN.is_match(&value) {
            return Err(MemberValidationError::InvalidEmail(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_value_conversions {
    ($($name:ident),+) => {$(
        impl TryFrom<String> for $name {
            type Error = MemberValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )+};
}

string_value_conversions!(Height, Weight, Email);

pub(crate) fn required(value: String, field: &'static str) -> Result<String, MemberValidationError> {
    if value.trim().is_empty() {
        return Err(MemberValidationError::EmptyField(field));
    }
    Ok(value)
}
