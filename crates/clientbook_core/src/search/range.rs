//! Date-time range predicate for appointment search and clash detection.
//!
//! # Responsibility
//! - Represent a closed `[start, end]` interval with unbounded defaults.
//! - Build intervals from keywords, relative day offsets and explicit dates.
//! - Decide interval overlap.
//!
//! # Invariants
//! - Overlap is inclusive: `start1 <= end2 && start2 <= end1`, so
//!   intervals that only touch at a boundary overlap.
//! - Overlap is symmetric and every interval overlaps itself.

use crate::model::appointment::{Appointment, AppointmentLength};
use crate::model::datetime::{end_of_day, parse_date, parse_time, start_of_day, AppointmentDateTime};
use crate::model::value::ValidationError;
use chrono::{Days, Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DATE_TIME_QUERY_CONSTRAINTS: &str = "Please enter a valid DateTime in one of the \
    following formats: 'today' for today's date; '+N' or '-N' where N is the number of days \
    from today (no more than 4 digits); 'dd-MM-yyyy (HHmm)' for a specific date; \
    'dd-MM-yyyy (HHmm) to dd-MM-yyyy (HHmm)' for a custom date range. Time (HHmm) is optional. \
    All dates must be valid calendar dates and a range must not end before it starts.";

const KEYWORD_TODAY: &str = "today";
const RANGE_SEPARATOR: &str = " to ";

static RELATIVE_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]\d{1,4}$").expect("valid relative days regex"));

/// Closed date-time interval used to filter appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeRangeQuery {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Default for DateTimeRangeQuery {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl DateTimeRangeQuery {
    /// Interval covering every representable instant.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDateTime::MIN,
            end: NaiveDateTime::MAX,
        }
    }

    /// Interval with explicit bounds. `None` leaves that side unbounded.
    pub fn between(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            start: start.unwrap_or(NaiveDateTime::MIN),
            end: end.unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// Interval spanning `length` minutes from `start`.
    pub fn interval(start: AppointmentDateTime, length: AppointmentLength) -> Self {
        Self {
            start: start.as_naive(),
            end: start.plus_minutes(length.minutes()),
        }
    }

    /// Interval occupied by an appointment.
    pub fn for_appointment(appointment: &Appointment) -> Self {
        Self::interval(appointment.date_time, appointment.length)
    }

    /// The calendar day of `instant`, from 00:00:00 to 23:59:59.
    pub fn on_day(instant: NaiveDateTime) -> Self {
        let date = instant.date();
        Self {
            start: start_of_day(date),
            end: end_of_day(date),
        }
    }

    /// Today in local time.
    pub fn today() -> Self {
        Self::today_at(local_now())
    }

    pub fn today_at(now: NaiveDateTime) -> Self {
        Self::on_day(now)
    }

    /// Relative window from today in local time; see
    /// [`DateTimeRangeQuery::within_relative_days_at`].
    pub fn within_relative_days(days: i64) -> Self {
        Self::within_relative_days_at(days, local_now())
    }

    /// `days >= 0`: today 00:00 up to 00:00 `days` later.
    /// `days < 0`: 00:00 `|days|` days ago up to today 23:59:59.
    pub fn within_relative_days_at(days: i64, now: NaiveDateTime) -> Self {
        let today = now.date();
        let midnight = start_of_day(today);
        let offset = Days::new(days.unsigned_abs());
        if days >= 0 {
            Self {
                start: midnight,
                end: midnight
                    .checked_add_days(offset)
                    .unwrap_or(NaiveDateTime::MAX),
            }
        } else {
            Self {
                start: midnight
                    .checked_sub_days(offset)
                    .unwrap_or(NaiveDateTime::MIN),
                end: end_of_day(today),
            }
        }
    }

    /// Parses the textual query forms relative to local time.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::parse_at(raw, local_now())
    }

    /// Parses `today`, `+N`/`-N`, `d-M-yyyy[ HHmm]` or
    /// `d-M-yyyy[ HHmm] to d-M-yyyy[ HHmm]` relative to `now`.
    ///
    /// A date without a time means 00:00 when it starts a range and
    /// 23:59:59 when it ends one.
    pub fn parse_at(raw: &str, now: NaiveDateTime) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::new("date_time_query", raw, DATE_TIME_QUERY_CONSTRAINTS);
        let text = raw.trim();

        if text.eq_ignore_ascii_case(KEYWORD_TODAY) {
            return Ok(Self::today_at(now));
        }

        if RELATIVE_DAYS_RE.is_match(text) {
            let days: i64 = text.parse().map_err(|_| invalid())?;
            return Ok(Self::within_relative_days_at(days, now));
        }

        if let Some((left, right)) = text.split_once(RANGE_SEPARATOR) {
            let start = parse_point(left, Bound::Start).ok_or_else(invalid)?;
            let end = parse_point(right, Bound::End).ok_or_else(invalid)?;
            if end < start {
                return Err(invalid());
            }
            return Ok(Self { start, end });
        }

        let instant = parse_point(text, Bound::Start).ok_or_else(invalid)?;
        Ok(Self::on_day(instant))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::unbounded()
    }

    pub fn overlaps(&self, other: &DateTimeRangeQuery) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether the appointment's own interval overlaps this one.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.overlaps(&Self::for_appointment(appointment))
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_point(text: &str, bound: Bound) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let date = parse_date(parts.next()?)?;
    let time = parts.next();
    if parts.next().is_some() {
        return None;
    }

    match (time, bound) {
        (Some(time_text), _) => Some(date.and_time(parse_time(time_text)?)),
        (None, Bound::Start) => Some(start_of_day(date)),
        (None, Bound::End) => Some(end_of_day(date)),
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::{DateTimeRangeQuery, DATE_TIME_QUERY_CONSTRAINTS};
    use crate::model::appointment::AppointmentLength;
    use crate::model::datetime::AppointmentDateTime;
    use chrono::NaiveDateTime;

    fn at(text: &str) -> NaiveDateTime {
        AppointmentDateTime::parse(text).unwrap().as_naive()
    }

    fn end_of(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%d-%m-%Y %H%M%S").unwrap()
    }

    #[test]
    fn overlap_is_inclusive_at_boundaries() {
        let first = DateTimeRangeQuery::between(Some(at("12-10-2025 1430")), Some(at("12-10-2025 1600")));
        let touching = DateTimeRangeQuery::between(Some(at("12-10-2025 1600")), Some(at("12-10-2025 1700")));
        let after = DateTimeRangeQuery::between(Some(at("12-10-2025 1601")), Some(at("12-10-2025 1700")));

        assert!(first.overlaps(&touching));
        assert!(touching.overlaps(&first));
        assert!(!first.overlaps(&after));
        assert!(!after.overlaps(&first));
    }

    #[test]
    fn overlap_is_symmetric_and_reflexive() {
        let ranges = [
            DateTimeRangeQuery::unbounded(),
            DateTimeRangeQuery::between(Some(at("1-1-2025 0000")), Some(at("2-1-2025 0000"))),
            DateTimeRangeQuery::between(Some(at("1-1-2025 1200")), Some(at("1-1-2025 1200"))),
            DateTimeRangeQuery::between(None, Some(at("31-12-2024 2359"))),
            DateTimeRangeQuery::between(Some(at("3-1-2025 0000")), None),
        ];
        for left in &ranges {
            assert!(left.overlaps(left));
            for right in &ranges {
                assert_eq!(left.overlaps(right), right.overlaps(left));
            }
        }
    }

    #[test]
    fn interval_spans_length_minutes() {
        let range = DateTimeRangeQuery::interval(
            AppointmentDateTime::parse("12-10-2025 1430").unwrap(),
            AppointmentLength::from_minutes(90).unwrap(),
        );
        assert_eq!(range.start(), at("12-10-2025 1430"));
        assert_eq!(range.end(), at("12-10-2025 1600"));
    }

    #[test]
    fn today_covers_whole_local_day() {
        let now = at("15-6-2025 1012");
        let today = DateTimeRangeQuery::today_at(now);
        assert_eq!(today.start(), at("15-6-2025 0000"));
        assert_eq!(today.end(), end_of("15-06-2025 235959"));
    }

    #[test]
    fn relative_days_direction() {
        let now = at("15-6-2025 1012");
        let forward = DateTimeRangeQuery::within_relative_days_at(3, now);
        assert_eq!(forward.start(), at("15-6-2025 0000"));
        assert_eq!(forward.end(), at("18-6-2025 0000"));

        let backward = DateTimeRangeQuery::within_relative_days_at(-3, now);
        assert_eq!(backward.start(), at("12-6-2025 0000"));
        assert_eq!(backward.end(), end_of("15-06-2025 235959"));
    }

    #[test]
    fn parse_accepts_all_textual_forms() {
        let now = at("15-6-2025 1012");
        assert_eq!(
            DateTimeRangeQuery::parse_at("today", now).unwrap(),
            DateTimeRangeQuery::today_at(now)
        );
        assert_eq!(
            DateTimeRangeQuery::parse_at("+234", now).unwrap(),
            DateTimeRangeQuery::within_relative_days_at(234, now)
        );
        assert_eq!(
            DateTimeRangeQuery::parse_at("-3", now).unwrap(),
            DateTimeRangeQuery::within_relative_days_at(-3, now)
        );
        assert_eq!(
            DateTimeRangeQuery::parse_at("12-10-2025 1200", now).unwrap(),
            DateTimeRangeQuery::on_day(at("12-10-2025 1200"))
        );
        assert_eq!(
            DateTimeRangeQuery::parse_at("4-10-2025", now).unwrap(),
            DateTimeRangeQuery::on_day(at("4-10-2025 0000"))
        );

        let range = DateTimeRangeQuery::parse_at("12-10-2025 1200 to 13-10-2025 1300", now).unwrap();
        assert_eq!(range.start(), at("12-10-2025 1200"));
        assert_eq!(range.end(), at("13-10-2025 1300"));

        let date_only = DateTimeRangeQuery::parse_at("12-10-2025 to 13-10-2025", now).unwrap();
        assert_eq!(date_only.start(), at("12-10-2025 0000"));
        assert_eq!(date_only.end(), end_of("13-10-2025 235959"));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        let now = at("15-6-2025 1012");
        for raw in [
            "",
            "tomorrow",
            "not today",
            "+23456",
            "-23456",
            "24-103-2025",
            "4-10-2025 12000",
            "24-10-2025 1000 to",
            "12-20-2015 1200",
            "12-10-2025 1200 too 13-10-2025",
            "13-10-2025 to 12-10-2025",
        ] {
            let err = DateTimeRangeQuery::parse_at(raw, now).expect_err(raw);
            assert_eq!(err.constraint(), DATE_TIME_QUERY_CONSTRAINTS);
        }
    }
}
