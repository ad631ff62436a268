//! Command operations over the record store.
//!
//! # Responsibility
//! - Resolve command targets against the filtered view.
//! - Orchestrate duplicate, clash and client checks before committing.
//! - Persist the full snapshot after every successful mutation.
//!
//! # Invariants
//! - Failed commands leave the store unchanged.
//! - A persistence failure is reported after the in-memory change has been
//!   applied; the next successful save writes it out.
//! - Client and appointment targets must be visible in the current view.

use super::command::{
    Command, CommandError, CommandOutcome, CommandResult, FindRequest, LinkCreateRequest,
    ServiceResult,
};
use super::descriptor::{EditAppointmentDescriptor, EditPersonDescriptor};
use crate::logging::COMMAND_TARGET;
use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::person::Person;
use crate::model::value::Name;
use crate::repo::SnapshotRepository;
use crate::search::PersonMatchPolicy;
use crate::store::{AddressBook, ClientView, ViewMode};
use log::{info, warn};
use std::time::Instant;

/// Use-case service owning the store, its view and the persistence sink.
pub struct ClientService<R: SnapshotRepository> {
    book: AddressBook,
    view: ClientView,
    repo: R,
    delete_policy: PersonMatchPolicy,
}

impl<R: SnapshotRepository> ClientService<R> {
    /// Creates a service over an empty store without reading `repo`.
    pub fn new(repo: R, delete_policy: PersonMatchPolicy) -> Self {
        Self {
            book: AddressBook::new(),
            view: ClientView::new(),
            repo,
            delete_policy,
        }
    }

    /// Creates a service from the snapshot persisted in `repo`, or an empty
    /// store when nothing has been saved yet.
    pub fn load(repo: R, delete_policy: PersonMatchPolicy) -> ServiceResult<Self> {
        let book = match repo.load_snapshot()? {
            Some(snapshot) => AddressBook::from_snapshot(snapshot)?,
            None => AddressBook::new(),
        };
        info!(
            target: COMMAND_TARGET,
            "event=service_load module=service status=ok persons={} appointments={} delete_policy={}",
            book.persons().len(),
            book.appointments().len(),
            delete_policy.as_str()
        );
        Ok(Self {
            book,
            view: ClientView::new(),
            repo,
            delete_policy,
        })
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    pub fn view(&self) -> &ClientView {
        &self.view
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    pub fn filtered_persons(&self) -> Vec<&Person> {
        self.view.filtered_persons(&self.book)
    }

    pub fn filtered_appointments(&self) -> Vec<&Appointment> {
        self.view.filtered_appointments(&self.book)
    }

    /// Runs one command and logs its outcome.
    ///
    /// # Side effects
    /// - Emits `command_execute` events with command name, status and
    ///   duration. User data is never logged.
    pub fn execute(&mut self, command: Command) -> CommandOutcome {
        let started_at = Instant::now();
        let name = command.name();
        let outcome = match command {
            Command::AddPerson(person) => self.add_person(person),
            Command::EditPerson { target, descriptor } => self.edit_person(&target, &descriptor),
            Command::DeletePerson(target) => self.delete_person(&target),
            Command::List => Ok(self.list()),
            Command::Find(request) => Ok(self.find(request)),
            Command::Clear => self.clear(),
            Command::LinkCreate(request) => self.link_create(&request),
            Command::LinkEdit { id, descriptor } => self.link_edit(&id, &descriptor),
            Command::LinkDelete(id) => self.link_delete(&id),
        };

        match &outcome {
            Ok(_) => info!(
                target: COMMAND_TARGET,
                "event=command_execute module=service status=ok command={} duration_ms={}",
                name,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                target: COMMAND_TARGET,
                "event=command_execute module=service status=error command={} duration_ms={} error_code={}",
                name,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        outcome
    }

    pub fn add_person(&mut self, person: Person) -> CommandOutcome {
        if self.book.has_person(&person) {
            return Err(CommandError::DuplicatePerson);
        }
        let name = person.name.clone();
        self.book.add_person(person)?;
        let stored = self.stored_person(&name)?;
        self.persist()?;
        Ok(CommandResult::with_person(
            format!("New person added: {stored}"),
            stored,
        ))
    }

    /// Edits the visible person named exactly `target`.
    pub fn edit_person(
        &mut self,
        target: &Name,
        descriptor: &EditPersonDescriptor,
    ) -> CommandOutcome {
        if !descriptor.is_any_field_edited() {
            return Err(CommandError::NoFieldEdited);
        }
        let current = match self.book.person(target) {
            None => return Err(CommandError::NotFound(target.clone())),
            Some(person) if !self.view.is_person_visible(person) => {
                return Err(CommandError::NotInDisplayedList(target.clone()))
            }
            Some(person) => person.clone(),
        };

        let edited = descriptor.apply_to(&current);
        if !current.is_same_person(&edited) && self.book.has_person(&edited) {
            return Err(CommandError::DuplicatePerson);
        }
        let new_name = edited.name.clone();
        self.book.set_person(&current, edited)?;
        let stored = self.stored_person(&new_name)?;
        self.persist()?;
        Ok(CommandResult::with_person(
            format!("Edited Person: {stored}"),
            stored,
        ))
    }

    /// Deletes the single visible person matching `target` under the
    /// configured [`PersonMatchPolicy`], cascading to owned appointments.
    ///
    /// # Errors
    /// - `NotFound` when no stored person matches.
    /// - `NotInDisplayedList` when matches exist but none is visible.
    /// - `AmbiguousMatch` when more than one visible person matches.
    pub fn delete_person(&mut self, target: &Name) -> CommandOutcome {
        let policy = self.delete_policy;
        let matches: Vec<&Person> = self
            .book
            .persons()
            .iter()
            .filter(|person| policy.matches(&person.name, target))
            .collect();
        if matches.is_empty() {
            return Err(CommandError::NotFound(target.clone()));
        }

        let visible: Vec<&Person> = matches
            .into_iter()
            .filter(|person| self.view.is_person_visible(person))
            .collect();
        let person = match visible.as_slice() {
            [] => return Err(CommandError::NotInDisplayedList(target.clone())),
            [only] => (*only).clone(),
            many => {
                return Err(CommandError::AmbiguousMatch(
                    many.iter().map(|person| person.name.clone()).collect(),
                ))
            }
        };

        let removed = self.book.remove_person(&person)?;
        self.persist()?;
        Ok(CommandResult::with_person(
            format!("Deleted Person: {removed}"),
            removed,
        ))
    }

    /// Shows every person again.
    pub fn list(&mut self) -> CommandResult {
        self.view.show_all_persons();
        self.view.set_mode(ViewMode::Persons);
        CommandResult::message("Listed all persons")
    }

    /// Applies search filters. Person and appointment results are
    /// independent views.
    pub fn find(&mut self, request: FindRequest) -> CommandResult {
        let FindRequest {
            person,
            appointment,
        } = request;
        self.view.filter_persons(person);

        match appointment.filter(|query| !query.is_empty()) {
            None => {
                self.view.set_mode(ViewMode::Persons);
                let count = self.filtered_persons().len();
                CommandResult::message(format!("{count} persons listed!"))
            }
            Some(query) => {
                self.view.filter_appointments(query);
                self.view.set_mode(ViewMode::Appointments);
                let count = self.filtered_appointments().len();
                CommandResult::message(format!("{count} appointments listed!"))
            }
        }
    }

    pub fn clear(&mut self) -> CommandOutcome {
        self.book.reset_data();
        self.view.reset();
        self.persist()?;
        Ok(CommandResult::message("Address book has been cleared!"))
    }

    /// Creates an appointment for a visible client.
    ///
    /// Checks run in order: duplicate, clash, client lookup. The stored
    /// appointment uses the client's stored spelling of the name; an exact
    /// spelling wins over a case-insensitive match.
    pub fn link_create(&mut self, request: &LinkCreateRequest) -> CommandOutcome {
        let client = self.visible_client(&request.client_name).cloned();
        let client_name = client
            .as_ref()
            .map_or_else(|| request.client_name.clone(), |person| person.name.clone());

        let id = self.book.generate_id()?;
        let appointment = request.build(id, client_name);

        if self.book.has_appointment(&appointment) {
            return Err(CommandError::DuplicateAppointment);
        }
        self.ensure_no_clash(&appointment)?;
        let client =
            client.ok_or_else(|| CommandError::NoSuchPerson(request.client_name.clone()))?;

        self.book
            .add_appointment_with_person(appointment.clone(), &client)?;
        self.persist()?;
        Ok(CommandResult::with_appointment(
            format!("New appointment linked to {}: {appointment}", client.name),
            appointment,
        ))
    }

    /// Edits a visible appointment in place, keeping its id and client.
    pub fn link_edit(
        &mut self,
        id: &AppointmentId,
        descriptor: &EditAppointmentDescriptor,
    ) -> CommandOutcome {
        if !descriptor.is_any_field_edited() {
            return Err(CommandError::NoFieldEdited);
        }
        let current = self.visible_appointment(id)?;
        let edited = descriptor.apply_to(&current);
        let client = self.visible_owner(&current)?;

        if !current.is_same_appointment(&edited) && self.book.has_appointment(&edited) {
            return Err(CommandError::DuplicateAppointment);
        }
        self.ensure_no_clash(&edited)?;

        self.book
            .set_appointment_with_person(&current, edited.clone(), &client)?;
        self.view.show_all_appointments();
        self.persist()?;
        Ok(CommandResult::with_appointment(
            format!("Appointment with {} edited to:\n {edited}", edited.client_name),
            edited,
        ))
    }

    /// Removes a visible appointment from the store and its client.
    pub fn link_delete(&mut self, id: &AppointmentId) -> CommandOutcome {
        let appointment = self.visible_appointment(id)?;
        let client = self.visible_owner(&appointment)?;

        self.book
            .unset_appointment_with_person(&appointment, &client)?;
        self.view.show_all_appointments();
        self.persist()?;
        Ok(CommandResult::with_appointment(
            format!("Appointment with {} deleted: {appointment}", client.name),
            appointment,
        ))
    }

    /// Visible person named `name`, preferring an exact match over a
    /// case-insensitive one.
    fn visible_client(&self, name: &Name) -> Option<&Person> {
        let visible = self.filtered_persons();
        visible
            .iter()
            .find(|person| &person.name == name)
            .or_else(|| visible.iter().find(|person| person.name.eq_ignore_case(name)))
            .copied()
    }

    /// The stored owner of `appointment`, which must be visible.
    fn visible_owner(&self, appointment: &Appointment) -> ServiceResult<Person> {
        self.book
            .person(&appointment.client_name)
            .filter(|person| self.view.is_person_visible(person))
            .cloned()
            .ok_or_else(|| CommandError::NoSuchPerson(appointment.client_name.clone()))
    }

    fn visible_appointment(&self, id: &AppointmentId) -> ServiceResult<Appointment> {
        self.filtered_appointments()
            .into_iter()
            .find(|appointment| &appointment.id == id)
            .cloned()
            .ok_or_else(|| CommandError::AppointmentNotFound(id.clone()))
    }

    fn ensure_no_clash(&self, candidate: &Appointment) -> ServiceResult<()> {
        match self.book.clashed_appointment(candidate) {
            Some(existing) => Err(CommandError::SchedulingClash {
                existing_id: existing.id.clone(),
                existing_time: existing.date_time,
                candidate_time: candidate.date_time,
            }),
            None => Ok(()),
        }
    }

    fn stored_person(&self, name: &Name) -> ServiceResult<Person> {
        self.book
            .person(name)
            .cloned()
            .ok_or_else(|| CommandError::NotFound(name.clone()))
    }

    fn persist(&mut self) -> ServiceResult<()> {
        let snapshot = self.book.snapshot();
        self.repo.save_snapshot(&snapshot)?;
        Ok(())
    }
}
