//! Record store aggregate owning persons, appointments and the id ledger.
//!
//! # Responsibility
//! - Keep person back-references and the appointment collection in sync.
//! - Allocate fresh appointment identifiers.
//! - Detect scheduling clashes between confirmed appointments.
//!
//! # Invariants
//! - Cross-collection mutation only happens through `AddressBook` methods;
//!   inner collections are exposed read-only.
//! - Every stored appointment id is in the ledger and in its client's
//!   `appointment_ids`; removing a person removes its appointments from
//!   both places.
//! - `generate_id` never returns an id present in the ledger.

use super::unique_list::{CollectionError, UniqueList};
use crate::logging::STORE_TARGET;
use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::person::Person;
use crate::model::snapshot::Snapshot;
use crate::model::value::Name;
use crate::search::range::DateTimeRangeQuery;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Upper bound on identifier candidates tried by one allocation.
pub const MAX_ID_ATTEMPTS: usize = 1_000;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Collection(CollectionError),
    PersonNotFound(Name),
    DuplicateAppointment,
    /// The appointment belongs to a different client than the given person.
    ClientMismatch {
        appointment: AppointmentId,
        person: Name,
    },
    IdSpaceExhausted { attempts: usize },
    InvalidSnapshot(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection(err) => write!(f, "{err}"),
            Self::PersonNotFound(name) => write!(f, "person not found: {name}"),
            Self::DuplicateAppointment => f.write_str("appointment already exists"),
            Self::ClientMismatch {
                appointment,
                person,
            } => write!(f, "appointment {appointment} does not belong to {person}"),
            Self::IdSpaceExhausted { attempts } => write!(
                f,
                "could not allocate a fresh appointment id after {attempts} attempts"
            ),
            Self::InvalidSnapshot(message) => write!(f, "invalid snapshot: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            Self::PersonNotFound(_)
            | Self::DuplicateAppointment
            | Self::ClientMismatch { .. }
            | Self::IdSpaceExhausted { .. }
            | Self::InvalidSnapshot(_) => None,
        }
    }
}

impl From<CollectionError> for StoreError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

#[derive(Debug, Clone)]
pub struct AddressBook {
    persons: UniqueList<Person>,
    appointments: UniqueList<Appointment>,
    ledger: BTreeSet<AppointmentId>,
}

impl Default for AddressBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressBook {
    pub fn new() -> Self {
        Self {
            persons: UniqueList::persons(),
            appointments: UniqueList::appointments(),
            ledger: BTreeSet::new(),
        }
    }

    /// Rebuilds a store from persisted lists.
    ///
    /// # Errors
    /// - `InvalidSnapshot` for duplicate persons/appointments/ids, an
    ///   appointment whose client is missing, or a back-reference to an
    ///   appointment that is absent or belongs to another client.
    ///
    /// Appointments missing from their client's back-references are
    /// appended to them.
    pub fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let Snapshot {
            mut persons,
            appointments,
        } = snapshot;
        let mut book = Self::new();

        let mut ledger = BTreeSet::new();
        for appointment in &appointments {
            if !ledger.insert(appointment.id.clone()) {
                return Err(StoreError::InvalidSnapshot(format!(
                    "duplicate appointment id {}",
                    appointment.id
                )));
            }
        }

        for person in &persons {
            for id in &person.appointment_ids {
                let owned = appointments
                    .iter()
                    .find(|appointment| &appointment.id == id)
                    .ok_or_else(|| {
                        StoreError::InvalidSnapshot(format!(
                            "{} references missing appointment {id}",
                            person.name
                        ))
                    })?;
                if owned.client_name != person.name {
                    return Err(StoreError::InvalidSnapshot(format!(
                        "{} references appointment {id} of {}",
                        person.name, owned.client_name
                    )));
                }
            }
        }

        for appointment in &appointments {
            let owner = persons
                .iter_mut()
                .find(|person| person.name == appointment.client_name)
                .ok_or_else(|| {
                    StoreError::InvalidSnapshot(format!(
                        "appointment {} has no client named {}",
                        appointment.id, appointment.client_name
                    ))
                })?;
            if !owner.owns_appointment(&appointment.id) {
                owner.appointment_ids.push(appointment.id.clone());
            }
        }

        book.persons
            .set_all(persons)
            .map_err(|err| StoreError::InvalidSnapshot(err.to_string()))?;
        book.appointments
            .set_all(appointments)
            .map_err(|err| StoreError::InvalidSnapshot(err.to_string()))?;
        book.ledger = ledger;
        Ok(book)
    }

    /// Ordered copy of both collections for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            persons: self.persons.as_slice().to_vec(),
            appointments: self.appointments.as_slice().to_vec(),
        }
    }

    /// Empties the store, including the id ledger.
    pub fn reset_data(&mut self) {
        self.persons.clear();
        self.appointments.clear();
        self.ledger.clear();
    }

    pub fn persons(&self) -> &[Person] {
        self.persons.as_slice()
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.appointments.as_slice()
    }

    pub fn allocated_ids(&self) -> impl Iterator<Item = &AppointmentId> {
        self.ledger.iter()
    }

    pub fn contains_id(&self, id: &AppointmentId) -> bool {
        self.ledger.contains(id)
    }

    /// Person with exactly this name.
    pub fn person(&self, name: &Name) -> Option<&Person> {
        self.persons.find(|person| &person.name == name)
    }

    pub fn find_appointment(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.appointments.find(|appointment| &appointment.id == id)
    }

    pub fn has_person(&self, person: &Person) -> bool {
        self.persons.contains(person)
    }

    /// Adds a person with no appointments; incoming back-references are
    /// dropped since only linking may create them.
    pub fn add_person(&mut self, mut person: Person) -> StoreResult<()> {
        person.appointment_ids.clear();
        self.persons.add(person)?;
        Ok(())
    }

    /// Replaces `target` with `edited`, keeping the stored back-references.
    ///
    /// On rename every owned appointment follows the new client name.
    pub fn set_person(&mut self, target: &Person, mut edited: Person) -> StoreResult<()> {
        let stored = self
            .person(&target.name)
            .ok_or_else(|| StoreError::PersonNotFound(target.name.clone()))?;
        edited.appointment_ids = stored.appointment_ids.clone();
        let renamed = stored.name != edited.name;
        let owned = edited.appointment_ids.clone();
        let new_name = edited.name.clone();

        self.persons.set(target, edited)?;

        if renamed {
            // The new name had no person, so it owns no appointments and the
            // renamed triples cannot collide.
            for id in &owned {
                if let Some(current) = self.find_appointment(id).cloned() {
                    let mut moved = current.clone();
                    moved.client_name = new_name.clone();
                    self.appointments.set(&current, moved)?;
                }
            }
            debug!(
                target: STORE_TARGET,
                "event=person_rename module=store status=ok appointments={}",
                owned.len()
            );
        }
        Ok(())
    }

    /// Removes a person and cascades to every owned appointment.
    pub fn remove_person(&mut self, person: &Person) -> StoreResult<Person> {
        let stored = self
            .person(&person.name)
            .cloned()
            .ok_or_else(|| StoreError::PersonNotFound(person.name.clone()))?;

        for id in &stored.appointment_ids {
            if let Some(appointment) = self.find_appointment(id).cloned() {
                self.appointments.remove(&appointment)?;
            }
            self.ledger.remove(id);
        }
        let removed = self.persons.remove(&stored)?;
        debug!(
            target: STORE_TARGET,
            "event=person_remove module=store status=ok cascaded={}",
            removed.appointment_ids.len()
        );
        Ok(removed)
    }

    /// Whether a stored appointment shares `(client_name, date_time, status)`.
    pub fn has_appointment(&self, appointment: &Appointment) -> bool {
        self.appointments.contains(appointment)
    }

    /// First stored appointment that clashes with `candidate`.
    ///
    /// Only confirmed appointments clash: both sides must be confirmed,
    /// belong to the same client, have different ids and overlapping
    /// intervals.
    pub fn clashed_appointment(&self, candidate: &Appointment) -> Option<&Appointment> {
        if !candidate.is_confirmed() {
            return None;
        }
        let window = DateTimeRangeQuery::for_appointment(candidate);
        self.appointments.find(|existing| {
            existing.is_confirmed()
                && existing.client_name == candidate.client_name
                && existing.id != candidate.id
                && window.matches(existing)
        })
    }

    /// Allocates an identifier not present in the ledger.
    ///
    /// # Errors
    /// - `IdSpaceExhausted` after [`MAX_ID_ATTEMPTS`] rejected candidates.
    pub fn generate_id(&self) -> StoreResult<AppointmentId> {
        self.generate_id_with(|| Uuid::new_v4().simple().to_string())
    }

    /// Allocation loop with an injectable candidate source.
    pub(crate) fn generate_id_with(
        &self,
        mut next_token: impl FnMut() -> String,
    ) -> StoreResult<AppointmentId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let Some(candidate) = AppointmentId::from_token(&next_token()) else {
                continue;
            };
            if !self.ledger.contains(&candidate) {
                return Ok(candidate);
            }
        }
        warn!(
            target: STORE_TARGET,
            "event=id_allocate module=store status=error attempts={} ledger_size={}",
            MAX_ID_ATTEMPTS,
            self.ledger.len()
        );
        Err(StoreError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Stores `appointment` and appends it to `person`'s back-references.
    ///
    /// # Errors
    /// - `PersonNotFound` when `person` is not stored.
    /// - `ClientMismatch` when the appointment names another client.
    /// - `DuplicateAppointment` when [`AddressBook::has_appointment`] holds.
    /// - `Collection(DuplicateEntity)` when the id is already allocated.
    pub fn add_appointment_with_person(
        &mut self,
        appointment: Appointment,
        person: &Person,
    ) -> StoreResult<()> {
        self.require_person(&person.name)?;
        require_owner(&appointment, person)?;
        if self.has_appointment(&appointment) {
            return Err(StoreError::DuplicateAppointment);
        }
        if self.ledger.contains(&appointment.id) {
            return Err(CollectionError::DuplicateEntity {
                kind: "appointment id",
            }
            .into());
        }

        let id = appointment.id.clone();
        self.appointments.add(appointment)?;
        self.ledger.insert(id.clone());
        self.with_person_mut(&person.name, |owner| owner.appointment_ids.push(id))
    }

    /// Replaces `old` with `edited` in the collection and in `person`'s
    /// back-references. The ledger changes only when the id changes.
    pub fn set_appointment_with_person(
        &mut self,
        old: &Appointment,
        edited: Appointment,
        person: &Person,
    ) -> StoreResult<()> {
        self.require_person(&person.name)?;
        require_owner(old, person)?;
        require_owner(&edited, person)?;
        let old_id = old.id.clone();
        let new_id = edited.id.clone();
        if old_id != new_id && self.ledger.contains(&new_id) {
            return Err(CollectionError::DuplicateEntity {
                kind: "appointment id",
            }
            .into());
        }

        self.appointments.set(old, edited)?;
        if old_id != new_id {
            self.ledger.remove(&old_id);
            self.ledger.insert(new_id.clone());
        }
        self.with_person_mut(&person.name, |owner| {
            match owner.appointment_ids.iter().position(|id| id == &old_id) {
                Some(index) => owner.appointment_ids[index] = new_id,
                None => owner.appointment_ids.push(new_id),
            }
        })
    }

    /// Inverse of [`AddressBook::add_appointment_with_person`].
    pub fn unset_appointment_with_person(
        &mut self,
        appointment: &Appointment,
        person: &Person,
    ) -> StoreResult<()> {
        self.require_person(&person.name)?;
        require_owner(appointment, person)?;
        self.appointments.remove(appointment)?;
        self.ledger.remove(&appointment.id);
        self.with_person_mut(&person.name, |owner| {
            owner.appointment_ids.retain(|id| id != &appointment.id)
        })
    }

    fn require_person(&self, name: &Name) -> StoreResult<()> {
        match self.person(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::PersonNotFound(name.clone())),
        }
    }

    fn with_person_mut(&mut self, name: &Name, update: impl FnOnce(&mut Person)) -> StoreResult<()> {
        let owner = self
            .persons
            .find_mut(|person| &person.name == name)
            .ok_or_else(|| StoreError::PersonNotFound(name.clone()))?;
        update(owner);
        Ok(())
    }
}

fn require_owner(appointment: &Appointment, person: &Person) -> StoreResult<()> {
    if appointment.client_name == person.name {
        Ok(())
    } else {
        Err(StoreError::ClientMismatch {
            appointment: appointment.id.clone(),
            person: person.name.clone(),
        })
    }
}
