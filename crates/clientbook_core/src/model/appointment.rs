//! Appointment record and its field value types.
//!
//! # Responsibility
//! - Define the appointment linked to a client by name.
//! - Provide the two appointment comparisons used by the store.
//!
//! # Invariants
//! - `id` never changes once allocated; edits keep it.
//! - Loose identity is `(client_name, date_time, status)` and ignores `id`.
//! - Record identity is `id` equality.

use super::datetime::AppointmentDateTime;
use super::value::{string_value, Name, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const ID_CONSTRAINTS: &str = "Appointment IDs are 7 alphanumeric characters";
pub const LENGTH_CONSTRAINTS: &str =
    "Length should be a whole number of minutes between 1 and 1440";
pub const LOCATION_CONSTRAINTS: &str =
    "Location should be at most 100 characters and contain no control characters";
pub const TYPE_CONSTRAINTS: &str =
    "Type should be at most 100 characters and contain no control characters";
pub const MESSAGE_CONSTRAINTS: &str =
    "Message should be at most 500 characters and contain no control characters";
pub const STATUS_CONSTRAINTS: &str =
    "Status should be one of: planned, confirmed, completed, cancelled";

pub const ID_LEN: usize = 7;
pub const MAX_LENGTH_MINUTES: u32 = 24 * 60;
const MAX_LABEL_CHARS: usize = 100;
const MAX_MESSAGE_CHARS: usize = 500;

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{7}$").expect("valid appointment id regex"));

/// Opaque appointment identifier allocated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentId(String);

impl AppointmentId {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if !ID_RE.is_match(trimmed) {
            return Err(ValidationError::new("id", raw, ID_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Builds an id from the leading characters of a random hex token.
    ///
    /// Returns `None` when `token` has fewer than seven ASCII alphanumerics
    /// at its start.
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        let head = token.get(..ID_LEN)?;
        ID_RE.is_match(head).then(|| Self(head.to_string()))
    }
}

string_value!(AppointmentId);

/// Appointment length in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AppointmentLength(u32);

impl AppointmentLength {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let invalid = || ValidationError::new("length", raw, LENGTH_CONSTRAINTS);
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let minutes: u32 = trimmed.parse().map_err(|_| invalid())?;
        Self::from_minutes(minutes).map_err(|_| invalid())
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, ValidationError> {
        if minutes == 0 || minutes > MAX_LENGTH_MINUTES {
            return Err(ValidationError::new(
                "length",
                minutes.to_string(),
                LENGTH_CONSTRAINTS,
            ));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Display for AppointmentLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppointmentLength {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<u32> for AppointmentLength {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(value)
    }
}

impl From<AppointmentLength> for u32 {
    fn from(value: AppointmentLength) -> Self {
        value.0
    }
}

fn parse_free_text(
    field: &'static str,
    raw: &str,
    max_chars: usize,
    constraint: &'static str,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > max_chars || trimmed.chars().any(char::is_control) {
        return Err(ValidationError::new(field, raw, constraint));
    }
    Ok(trimmed.to_string())
}

/// Where the appointment takes place. Empty means unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentLocation(String);

impl AppointmentLocation {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        parse_free_text("location", raw, MAX_LABEL_CHARS, LOCATION_CONSTRAINTS).map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

string_value!(AppointmentLocation);

/// Free-form appointment category such as `home-visit`. Empty means unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentType(String);

impl AppointmentType {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        parse_free_text("type", raw, MAX_LABEL_CHARS, TYPE_CONSTRAINTS).map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

string_value!(AppointmentType);

/// Notes attached to an appointment. Empty means none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentMessage(String);

impl AppointmentMessage {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        parse_free_text("message", raw, MAX_MESSAGE_CHARS, MESSAGE_CONSTRAINTS).map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

string_value!(AppointmentMessage);

/// Booking lifecycle state. Only `Confirmed` appointments take part in
/// clash detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Planned,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ValidationError::new("status", raw, STATUS_CONSTRAINTS)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Scheduled appointment linked to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    /// Client reference by name; not an owning pointer.
    pub client_name: Name,
    pub date_time: AppointmentDateTime,
    pub length: AppointmentLength,
    #[serde(default)]
    pub location: AppointmentLocation,
    /// Serialized as `type` to match the user-facing vocabulary.
    #[serde(rename = "type", default)]
    pub kind: AppointmentType,
    #[serde(default)]
    pub message: AppointmentMessage,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Creates an appointment with empty location/type/message and
    /// `planned` status.
    pub fn new(
        id: AppointmentId,
        client_name: Name,
        date_time: AppointmentDateTime,
        length: AppointmentLength,
    ) -> Self {
        Self {
            id,
            client_name,
            date_time,
            length,
            location: AppointmentLocation::default(),
            kind: AppointmentType::default(),
            message: AppointmentMessage::default(),
            status: AppointmentStatus::default(),
        }
    }

    /// Loose identity used for duplicate detection; ignores `id`.
    pub fn is_same_appointment(&self, other: &Appointment) -> bool {
        self.client_name == other.client_name
            && self.date_time == other.date_time
            && self.status == other.status
    }

    /// Record identity used for replace/remove lookups.
    pub fn is_same_record(&self, other: &Appointment) -> bool {
        self.id == other.id
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == AppointmentStatus::Confirmed
    }
}

impl Display for Appointment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at {} for {} min; Status: {}",
            self.id, self.client_name, self.date_time, self.length, self.status
        )?;
        if !self.location.is_empty() {
            write!(f, "; Location: {}", self.location)?;
        }
        if !self.kind.is_empty() {
            write!(f, "; Type: {}", self.kind)?;
        }
        if !self.message.is_empty() {
            write!(f, "; Notes: {}", self.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Appointment, AppointmentId, AppointmentLength, AppointmentLocation, AppointmentMessage,
        AppointmentStatus, AppointmentType,
    };
    use crate::model::datetime::AppointmentDateTime;
    use crate::model::value::Name;

    fn appointment(id: &str, status: AppointmentStatus) -> Appointment {
        let mut appt = Appointment::new(
            AppointmentId::parse(id).unwrap(),
            Name::parse("Alex Wu").unwrap(),
            AppointmentDateTime::parse("12-10-2025 1430").unwrap(),
            AppointmentLength::from_minutes(90).unwrap(),
        );
        appt.status = status;
        appt
    }

    #[test]
    fn id_requires_seven_alphanumerics() {
        assert!(AppointmentId::parse("107f3db").is_ok());
        assert!(AppointmentId::parse("107f3d").is_err());
        assert!(AppointmentId::parse("107f3db9").is_err());
        assert!(AppointmentId::parse("107-3db").is_err());
        assert_eq!(
            AppointmentId::from_token("1b9a395e4c").unwrap().as_str(),
            "1b9a395"
        );
        assert!(AppointmentId::from_token("1b9").is_none());
    }

    #[test]
    fn length_bounds() {
        assert_eq!(AppointmentLength::parse(" 90 ").unwrap().minutes(), 90);
        assert!(AppointmentLength::parse("0").is_err());
        assert!(AppointmentLength::parse("1441").is_err());
        assert!(AppointmentLength::parse("-5").is_err());
        assert!(AppointmentLength::parse("1.5").is_err());
        assert!(AppointmentLength::parse("99999999999").is_err());
    }

    #[test]
    fn free_text_fields_allow_empty_and_reject_control_chars() {
        assert!(AppointmentLocation::parse("").unwrap().is_empty());
        assert_eq!(
            AppointmentType::parse(" home-visit ").unwrap().as_str(),
            "home-visit"
        );
        assert!(AppointmentMessage::parse("line\u{7}bell").is_err());
        assert!(AppointmentLocation::parse(&"x".repeat(101)).is_err());
        assert!(AppointmentMessage::parse(&"x".repeat(500)).is_ok());
    }

    #[test]
    fn status_is_case_insensitive_and_canonical() {
        assert_eq!(
            AppointmentStatus::parse("CONFIRMED").unwrap(),
            AppointmentStatus::Confirmed
        );
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Planned);
        assert!(AppointmentStatus::parse("maybe").is_err());
    }

    #[test]
    fn loose_identity_ignores_id_but_record_identity_does_not() {
        let first = appointment("aaaaaaa", AppointmentStatus::Confirmed);
        let mut second = appointment("bbbbbbb", AppointmentStatus::Confirmed);
        second.location = AppointmentLocation::parse("Bukit Merah FSC").unwrap();

        assert!(first.is_same_appointment(&second));
        assert!(!first.is_same_record(&second));

        let planned = appointment("aaaaaaa", AppointmentStatus::Planned);
        assert!(!first.is_same_appointment(&planned));
        assert!(first.is_same_record(&planned));
    }

    #[test]
    fn serialization_uses_type_field_and_revalidates() {
        let appt = appointment("107f3db", AppointmentStatus::Confirmed);
        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["id"], "107f3db");
        assert_eq!(json["date_time"], "12-10-2025 1430");
        assert_eq!(json["length"], 90);
        assert_eq!(json["type"], "");
        assert_eq!(json["status"], "confirmed");

        let decoded: Appointment = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(decoded, appt);

        let mut broken = json;
        broken["date_time"] = serde_json::json!("30-2-2025 1200");
        assert!(serde_json::from_value::<Appointment>(broken).is_err());
    }

    #[test]
    fn display_omits_empty_optional_fields() {
        let mut appt = appointment("107f3db", AppointmentStatus::Planned);
        assert_eq!(
            appt.to_string(),
            "[107f3db] Alex Wu at 12-10-2025 1430 for 90 min; Status: planned"
        );
        appt.kind = AppointmentType::parse("home-visit").unwrap();
        assert!(appt.to_string().ends_with("; Type: home-visit"));
    }
}
