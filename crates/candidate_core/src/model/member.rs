//! Member domain record.
//!
//! # Responsibility
//! - Hold a candidate profile as one immutable, validated value.
//! - Expose the profile's age relative to "now" or any other instant.
//!
//! # Invariants
//! - `username` is non-blank and is the identity used by repositories.
//! - Every constructor path (including serde) runs `Member::validate()`.

use crate::model::age::age_in_years;
use crate::model::value::{Address, Email, Height, MemberValidationError, Weight};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Candidate profile record.
///
/// `date_of_birth` keeps the offset it was recorded with; ages are computed
/// in that offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MemberFields")]
pub struct Member {
    username: String,
    password: String,
    address: Address,
    date_of_birth: DateTime<FixedOffset>,
    limits: String,
    height: Height,
    weight: Weight,
    body_type: String,
    ethnicity: String,
    email: Email,
}

#[derive(Deserialize)]
struct MemberFields {
    username: String,
    password: String,
    address: Address,
    date_of_birth: DateTime<FixedOffset>,
    limits: String,
    height: Height,
    weight: Weight,
    body_type: String,
    ethnicity: String,
    email: Email,
}

impl Member {
    /// Creates a validated member.
    ///
    /// # Errors
    /// - `MemberValidationError::EmptyUsername` when `username` is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        address: Address,
        date_of_birth: DateTime<FixedOffset>,
        limits: impl Into<String>,
        height: Height,
        weight: Weight,
        body_type: impl Into<String>,
        ethnicity: impl Into<String>,
        email: Email,
    ) -> Result<Self, MemberValidationError> {
        let member = Self {
            username: username.into(),
            password: password.into(),
            address,
            date_of_birth,
            limits: limits.into(),
            height,
            weight,
            body_type: body_type.into(),
            ethnicity: ethnicity.into(),
            email,
        };
        member.validate()?;
        Ok(member)
    }

    /// Checks record-level invariants.
    ///
    /// Value objects validate themselves on construction, so only the
    /// identity remains to be checked here.
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.username.trim().is_empty() {
            return Err(MemberValidationError::EmptyUsername);
        }
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn date_of_birth(&self) -> DateTime<FixedOffset> {
        self.date_of_birth
    }

    pub fn limits(&self) -> &str {
        &self.limits
    }

    pub fn height(&self) -> &Height {
        &self.height
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn body_type(&self) -> &str {
        &self.body_type
    }

    pub fn ethnicity(&self) -> &str {
        &self.ethnicity
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Whole years elapsed since birth, as of the current instant.
    pub fn age(&self) -> u32 {
        self.age_at(&Utc::now())
    }

    /// Whole years elapsed since birth, as of `as_of`.
    ///
    /// `as_of` is normalized into the birth offset before comparison.
    pub fn age_at<Tz: TimeZone>(&self, as_of: &DateTime<Tz>) -> u32 {
        age_in_years(&self.date_of_birth, as_of)
    }
}

impl TryFrom<MemberFields> for Member {
    type Error = MemberValidationError;

    fn try_from(value: MemberFields) -> Result<Self, Self::Error> {
        Self::new(
            value.username,
            value.password,
            value.address,
            value.date_of_birth,
            value.limits,
            value.height,
            value.weight,
            value.body_type,
            value.ethnicity,
            value.email,
        )
    }
}
