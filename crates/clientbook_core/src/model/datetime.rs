//! Appointment date-time value and shared calendar parsing helpers.
//!
//! # Responsibility
//! - Parse `d-M-yyyy HHmm` input with strict calendar validation.
//! - Provide date/time helpers reused by range queries.
//!
//! # Invariants
//! - Day and month accept one or two digits; year is exactly four digits.
//! - Time is exactly four digits, `0000..=2359`.
//! - Values carry minute precision.

use super::value::ValidationError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DATE_TIME_CONSTRAINTS: &str =
    "DateTime must be in the format dd-MM-yyyy HHmm, and must be valid calendar date/time.";

const DISPLAY_FORMAT: &str = "%d-%m-%Y %H%M";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("valid date regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})(\d{2})$").expect("valid time regex"));

/// Start instant of an appointment.
///
/// Equality and ordering follow the resolved calendar instant, so
/// `1-2-2025 0900` and `01-02-2025 0900` are the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppointmentDateTime(NaiveDateTime);

impl AppointmentDateTime {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::new("date_time", raw, DATE_TIME_CONSTRAINTS);
        let mut parts = raw.split_whitespace();
        let (Some(date_text), Some(time_text), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let date = parse_date(date_text).ok_or_else(invalid)?;
        let time = parse_time(time_text).ok_or_else(invalid)?;
        Ok(Self(date.and_time(time)))
    }

    /// Wraps an already-resolved instant, dropping sub-minute precision.
    pub fn from_naive(value: NaiveDateTime) -> Self {
        let truncated = value
            .with_second(0)
            .and_then(|v| v.with_nanosecond(0))
            .unwrap_or(value);
        Self(truncated)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Instant `minutes` after this one, saturating at the calendar maximum.
    pub fn plus_minutes(&self, minutes: u32) -> NaiveDateTime {
        self.0
            .checked_add_signed(Duration::minutes(i64::from(minutes)))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

impl Display for AppointmentDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for AppointmentDateTime {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for AppointmentDateTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AppointmentDateTime> for String {
    fn from(value: AppointmentDateTime) -> Self {
        value.to_string()
    }
}

/// Parses `d-M-yyyy` into a calendar date, rejecting impossible dates.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses `HHmm` (24-hour clock) into a time of day.
pub(crate) fn parse_time(text: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

pub(crate) fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::{AppointmentDateTime, DATE_TIME_CONSTRAINTS};

    #[test]
    fn accepts_single_and_double_digit_day_month() {
        for raw in ["12-3-2024 1100", "2-11-2024 1900", "2-3-2024 1900", "02-03-2024 1900"] {
            assert!(AppointmentDateTime::parse(raw).is_ok(), "{raw} should parse");
        }
        assert_eq!(
            AppointmentDateTime::parse("2-3-2024 1900").unwrap(),
            AppointmentDateTime::parse("02-03-2024 1900").unwrap()
        );
    }

    #[test]
    fn rejects_invalid_calendar_values() {
        for raw in [
            "",
            "32-01-2024 1900",
            "12-13-2024 1800",
            "12-13-12345 1700",
            "12-12-2024 12345",
            "12-12-2025 2400",
            "12-9-2025 1260",
            "12-12-2025 2460",
            "30-2-2025 1200",
            "31-2-2024 1200",
            "29-2-2025 1200",
            "12-12-2024",
            "12-12-2024 1200 extra",
        ] {
            let err = AppointmentDateTime::parse(raw).expect_err(raw);
            assert_eq!(err.constraint(), DATE_TIME_CONSTRAINTS);
        }
    }

    #[test]
    fn leap_day_follows_gregorian_rules() {
        assert!(AppointmentDateTime::parse("29-2-2024 0900").is_ok());
        assert!(AppointmentDateTime::parse("29-2-2000 0900").is_ok());
        assert!(AppointmentDateTime::parse("29-2-1900 0900").is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        let value = AppointmentDateTime::parse("4-3-2024 0905").unwrap();
        assert_eq!(value.to_string(), "04-03-2024 0905");
        assert_eq!(
            AppointmentDateTime::parse("24-12-2024 1200").unwrap().to_string(),
            "24-12-2024 1200"
        );
    }

    #[test]
    fn ordering_follows_instant() {
        let early = AppointmentDateTime::parse("24-12-2024 1200").unwrap();
        let late = AppointmentDateTime::parse("24-12-2024 1230").unwrap();
        assert!(early < late);
        assert_eq!(
            early.plus_minutes(30),
            late.as_naive(),
            "30 minutes after 1200 is 1230"
        );
    }
}
