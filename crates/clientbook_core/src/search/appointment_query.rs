//! Appointment filter.

use super::range::DateTimeRangeQuery;
use crate::model::appointment::{Appointment, AppointmentStatus, AppointmentType};

/// Optional-per-field appointment filter. Status and type are exact
/// matches; the date-time test is interval overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    date_time: Option<DateTimeRangeQuery>,
    kind: Option<AppointmentType>,
    status: Option<AppointmentStatus>,
}

impl AppointmentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_time(mut self, range: DateTimeRangeQuery) -> Self {
        self.date_time = Some(range);
        self
    }

    pub fn with_kind(mut self, kind: AppointmentType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date_time(&self) -> Option<&DateTimeRangeQuery> {
        self.date_time.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.date_time.is_none() && self.kind.is_none() && self.status.is_none()
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.date_time
            .as_ref()
            .map_or(true, |range| range.matches(appointment))
            && self.kind.as_ref().map_or(true, |kind| &appointment.kind == kind)
            && self.status.map_or(true, |status| appointment.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::AppointmentQuery;
    use crate::model::appointment::{
        Appointment, AppointmentId, AppointmentLength, AppointmentStatus, AppointmentType,
    };
    use crate::model::datetime::AppointmentDateTime;
    use crate::model::value::Name;
    use crate::search::range::DateTimeRangeQuery;

    fn appointment() -> Appointment {
        let mut appt = Appointment::new(
            AppointmentId::parse("a1b2c3d").unwrap(),
            Name::parse("Alex Wu").unwrap(),
            AppointmentDateTime::parse("12-10-2025 1430").unwrap(),
            AppointmentLength::from_minutes(90).unwrap(),
        );
        appt.kind = AppointmentType::parse("home-visit").unwrap();
        appt.status = AppointmentStatus::Confirmed;
        appt
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(AppointmentQuery::new().is_empty());
        assert!(AppointmentQuery::new().matches(&appointment()));
    }

    #[test]
    fn fields_are_anded() {
        let now = AppointmentDateTime::parse("12-10-2025 0800").unwrap().as_naive();
        let query = AppointmentQuery::new()
            .with_date_time(DateTimeRangeQuery::today_at(now))
            .with_kind(AppointmentType::parse("home-visit").unwrap())
            .with_status(AppointmentStatus::Confirmed);
        assert!(query.matches(&appointment()));

        let wrong_status = query.clone().with_status(AppointmentStatus::Planned);
        assert!(!wrong_status.matches(&appointment()));

        let wrong_kind = query.with_kind(AppointmentType::parse("office").unwrap());
        assert!(!wrong_kind.matches(&appointment()));
    }

    #[test]
    fn date_time_uses_appointment_interval() {
        let appt = appointment();
        let at = |text: &str| AppointmentDateTime::parse(text).unwrap().as_naive();

        let ends_at_start = DateTimeRangeQuery::between(None, Some(at("12-10-2025 1430")));
        assert!(AppointmentQuery::new().with_date_time(ends_at_start).matches(&appt));

        let starts_at_end = DateTimeRangeQuery::between(Some(at("12-10-2025 1600")), None);
        assert!(AppointmentQuery::new().with_date_time(starts_at_end).matches(&appt));

        let next_day = DateTimeRangeQuery::on_day(at("13-10-2025 0000"));
        assert!(!AppointmentQuery::new().with_date_time(next_day).matches(&appt));
    }
}
