//! Filtered view over the record store.
//!
//! # Responsibility
//! - Hold the active person and appointment filters.
//! - Expose the subsets currently visible to the user.
//!
//! # Invariants
//! - Person and appointment filters are independent; neither narrows the
//!   other collection.
//! - Filters are re-evaluated on every read, so store mutations are
//!   reflected without refreshing the view.

use super::address_book::AddressBook;
use crate::model::appointment::Appointment;
use crate::model::person::Person;
use crate::search::{AppointmentQuery, PersonQuery};

/// Which collection the user is currently looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Persons,
    Appointments,
}

#[derive(Debug, Clone, Default)]
pub struct ClientView {
    person_filter: PersonQuery,
    appointment_filter: AppointmentQuery,
    mode: ViewMode,
}

impl ClientView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn person_filter(&self) -> &PersonQuery {
        &self.person_filter
    }

    pub fn appointment_filter(&self) -> &AppointmentQuery {
        &self.appointment_filter
    }

    pub fn filter_persons(&mut self, query: PersonQuery) {
        self.person_filter = query;
    }

    pub fn filter_appointments(&mut self, query: AppointmentQuery) {
        self.appointment_filter = query;
    }

    pub fn show_all_persons(&mut self) {
        self.person_filter = PersonQuery::default();
    }

    pub fn show_all_appointments(&mut self) {
        self.appointment_filter = AppointmentQuery::default();
    }

    /// Clears both filters and returns to the person list.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_person_visible(&self, person: &Person) -> bool {
        self.person_filter.matches(person)
    }

    pub fn filtered_persons<'a>(&self, book: &'a AddressBook) -> Vec<&'a Person> {
        book.persons()
            .iter()
            .filter(|person| self.person_filter.matches(person))
            .collect()
    }

    pub fn filtered_appointments<'a>(&self, book: &'a AddressBook) -> Vec<&'a Appointment> {
        book.appointments()
            .iter()
            .filter(|appointment| self.appointment_filter.matches(appointment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientView, ViewMode};
    use crate::model::appointment::{
        Appointment, AppointmentId, AppointmentLength, AppointmentStatus,
    };
    use crate::model::datetime::AppointmentDateTime;
    use crate::model::person::Person;
    use crate::model::value::{Name, Phone};
    use crate::search::{AppointmentQuery, PersonQuery};
    use crate::store::address_book::AddressBook;

    fn book() -> AddressBook {
        let mut book = AddressBook::new();
        let alex = Person::new(Name::parse("Alex Wu").unwrap(), Phone::parse("123").unwrap());
        let bea = Person::new(Name::parse("Bea Lim").unwrap(), Phone::parse("456").unwrap());
        book.add_person(alex.clone()).unwrap();
        book.add_person(bea).unwrap();
        let mut appt = Appointment::new(
            AppointmentId::parse("aaaaaaa").unwrap(),
            alex.name.clone(),
            AppointmentDateTime::parse("12-10-2025 1430").unwrap(),
            AppointmentLength::from_minutes(30).unwrap(),
        );
        appt.status = AppointmentStatus::Confirmed;
        book.add_appointment_with_person(appt, &alex).unwrap();
        book
    }

    #[test]
    fn default_view_shows_everything() {
        let book = book();
        let view = ClientView::new();
        assert_eq!(view.mode(), ViewMode::Persons);
        assert_eq!(view.filtered_persons(&book).len(), 2);
        assert_eq!(view.filtered_appointments(&book).len(), 1);
    }

    #[test]
    fn filters_are_independent() {
        let book = book();
        let mut view = ClientView::new();
        view.filter_persons(PersonQuery::new().with_name_keywords(["bea"]));
        view.filter_appointments(AppointmentQuery::new().with_status(AppointmentStatus::Confirmed));

        let persons = view.filtered_persons(&book);
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name.as_str(), "Bea Lim");
        assert_eq!(view.filtered_appointments(&book).len(), 1);

        view.show_all_persons();
        view.filter_appointments(AppointmentQuery::new().with_status(AppointmentStatus::Planned));
        assert_eq!(view.filtered_persons(&book).len(), 2);
        assert!(view.filtered_appointments(&book).is_empty());

        view.reset();
        assert!(view.person_filter().is_empty());
        assert!(view.appointment_filter().is_empty());
    }
}
