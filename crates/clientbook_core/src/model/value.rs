//! Validated scalar value types for client records.
//!
//! # Responsibility
//! - Enforce per-field format rules at construction time.
//! - Provide canonical string forms used for display and persistence.
//!
//! # Invariants
//! - A value that exists has passed its format check.
//! - Parsers trim surrounding whitespace before validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const NAME_CONSTRAINTS: &str =
    "Names should only contain alphanumeric characters and spaces, and it should not be blank";
pub const PHONE_CONSTRAINTS: &str =
    "Phone numbers should only contain numbers, and it should be at least 3 digits long";
pub const EMAIL_CONSTRAINTS: &str = "Emails should be of the format local-part@domain. \
    The local-part should only contain alphanumeric characters and the special characters +_.- \
    and may not start or end with a special character. The domain is made of labels separated \
    by periods; the last label must be at least 2 characters long";
pub const ADDRESS_CONSTRAINTS: &str = "Addresses can take any values, and it should not be blank";
pub const TAG_CONSTRAINTS: &str = "Tag names should be alphanumeric";
pub const RANK_CONSTRAINTS: &str = "Rank should be one of: urgent, high, stable, none";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} ]*$").expect("valid name regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9]+(?:[+_.-][A-Za-z0-9]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)*[A-Za-z0-9][A-Za-z0-9-]*[A-Za-z0-9]$",
    )
    .expect("valid email regex")
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("valid tag regex"));

/// Error raised when raw input fails a value type's format rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    field: &'static str,
    value: String,
    constraint: &'static str,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, value: impl Into<String>, constraint: &'static str) -> Self {
        Self {
            field,
            value: value.into(),
            constraint,
        }
    }

    /// Field name the rejected value was meant for.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Raw rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human-readable constraint description.
    pub fn constraint(&self) -> &'static str {
        self.constraint
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.constraint)
    }
}

impl Error for ValidationError {}

/// Implements the shared string plumbing for a `struct T(String)` value type
/// that exposes `T::parse(&str) -> Result<T, ValidationError>`.
macro_rules! string_value {
    ($ty:ident) => {
        impl $ty {
            /// Returns the canonical string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::model::value::ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = $crate::model::value::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use string_value;

/// Full client name. Identity key for persons (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if !NAME_RE.is_match(trimmed) {
            return Err(ValidationError::new("name", raw, NAME_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Case-insensitive full-name equality.
    pub fn eq_ignore_case(&self, other: &Name) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }

    /// Whether `other` is a case-insensitive substring of this name.
    pub fn contains_ignore_case(&self, other: &Name) -> bool {
        self.0.to_lowercase().contains(&other.0.to_lowercase())
    }
}

string_value!(Name);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if !PHONE_RE.is_match(trimmed) {
            return Err(ValidationError::new("phone", raw, PHONE_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_value!(Phone);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::new("email", raw, EMAIL_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_value!(Email);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new("address", raw, ADDRESS_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_value!(Address);

/// Free-form client label. Tags are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if !TAG_RE.is_match(trimmed) {
            return Err(ValidationError::new("tag", raw, TAG_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }
}

string_value!(Tag);

/// Follow-up priority of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Urgent,
    High,
    Stable,
    /// No rank assigned.
    #[default]
    #[serde(rename = "none")]
    Unranked,
}

impl Rank {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "stable" => Ok(Self::Stable),
            "none" => Ok(Self::Unranked),
            _ => Err(ValidationError::new("rank", raw, RANK_CONSTRAINTS)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Stable => "stable",
            Self::Unranked => "none",
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}
