//! Typed commands, their results and the user-facing error taxonomy.

use super::descriptor::{EditAppointmentDescriptor, EditPersonDescriptor};
use crate::model::appointment::{
    Appointment, AppointmentId, AppointmentLength, AppointmentLocation, AppointmentMessage,
    AppointmentStatus, AppointmentType,
};
use crate::model::datetime::AppointmentDateTime;
use crate::model::person::Person;
use crate::model::value::{Name, ValidationError};
use crate::repo::RepoError;
use crate::search::{AppointmentQuery, PersonQuery};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, CommandError>;
pub type CommandOutcome = ServiceResult<CommandResult>;

/// One already-validated user request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPerson(Person),
    EditPerson {
        target: Name,
        descriptor: EditPersonDescriptor,
    },
    DeletePerson(Name),
    List,
    Find(FindRequest),
    Clear,
    LinkCreate(LinkCreateRequest),
    LinkEdit {
        id: AppointmentId,
        descriptor: EditAppointmentDescriptor,
    },
    LinkDelete(AppointmentId),
}

impl Command {
    /// Stable label used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddPerson(_) => "add",
            Self::EditPerson { .. } => "edit",
            Self::DeletePerson(_) => "delete",
            Self::List => "list",
            Self::Find(_) => "find",
            Self::Clear => "clear",
            Self::LinkCreate(_) => "link_create",
            Self::LinkEdit { .. } => "link_edit",
            Self::LinkDelete(_) => "link_delete",
        }
    }
}

/// Person filter plus an optional appointment filter.
///
/// An absent or empty appointment query means a person-only search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindRequest {
    pub person: PersonQuery,
    pub appointment: Option<AppointmentQuery>,
}

impl FindRequest {
    pub fn persons(person: PersonQuery) -> Self {
        Self {
            person,
            appointment: None,
        }
    }

    pub fn appointments(appointment: AppointmentQuery) -> Self {
        Self {
            person: PersonQuery::default(),
            appointment: Some(appointment),
        }
    }
}

/// Fields for a new appointment. Optional fields fall back to empty
/// location/type/message and `planned` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCreateRequest {
    pub client_name: Name,
    pub date_time: AppointmentDateTime,
    pub length: AppointmentLength,
    pub location: Option<AppointmentLocation>,
    pub kind: Option<AppointmentType>,
    pub message: Option<AppointmentMessage>,
    pub status: Option<AppointmentStatus>,
}

impl LinkCreateRequest {
    pub fn new(client_name: Name, date_time: AppointmentDateTime, length: AppointmentLength) -> Self {
        Self {
            client_name,
            date_time,
            length,
            location: None,
            kind: None,
            message: None,
            status: None,
        }
    }

    pub fn with_location(mut self, location: AppointmentLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_kind(mut self, kind: AppointmentType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_message(mut self, message: AppointmentMessage) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn build(&self, id: AppointmentId, client_name: Name) -> Appointment {
        let mut appointment = Appointment::new(id, client_name, self.date_time, self.length);
        appointment.location = self.location.clone().unwrap_or_default();
        appointment.kind = self.kind.clone().unwrap_or_default();
        appointment.message = self.message.clone().unwrap_or_default();
        appointment.status = self.status.unwrap_or_default();
        appointment
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffectedEntity {
    Person(Person),
    Appointment(Appointment),
}

impl AffectedEntity {
    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Self::Person(person) => Some(person),
            Self::Appointment(_) => None,
        }
    }

    pub fn as_appointment(&self) -> Option<&Appointment> {
        match self {
            Self::Appointment(appointment) => Some(appointment),
            Self::Person(_) => None,
        }
    }
}

impl Display for AffectedEntity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person(person) => write!(f, "{person}"),
            Self::Appointment(appointment) => write!(f, "{appointment}"),
        }
    }
}

/// Success message plus the produced, edited or deleted entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    pub entity: Option<AffectedEntity>,
}

impl CommandResult {
    pub fn message(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            entity: None,
        }
    }

    pub fn with_person(feedback: impl Into<String>, person: Person) -> Self {
        Self {
            feedback: feedback.into(),
            entity: Some(AffectedEntity::Person(person)),
        }
    }

    pub fn with_appointment(feedback: impl Into<String>, appointment: Appointment) -> Self {
        Self {
            feedback: feedback.into(),
            entity: Some(AffectedEntity::Appointment(appointment)),
        }
    }
}

/// Command failure. `Display` is the message shown to the user.
#[derive(Debug)]
pub enum CommandError {
    Validation(ValidationError),
    NotFound(Name),
    AppointmentNotFound(AppointmentId),
    NoSuchPerson(Name),
    AmbiguousMatch(Vec<Name>),
    DuplicatePerson,
    DuplicateAppointment,
    SchedulingClash {
        existing_id: AppointmentId,
        existing_time: AppointmentDateTime,
        candidate_time: AppointmentDateTime,
    },
    NotInDisplayedList(Name),
    NoFieldEdited,
    Store(StoreError),
    Storage(RepoError),
}

impl CommandError {
    /// Stable metadata-only code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AppointmentNotFound(_) => "appointment_not_found",
            Self::NoSuchPerson(_) => "no_such_person",
            Self::AmbiguousMatch(_) => "ambiguous_match",
            Self::DuplicatePerson => "duplicate_person",
            Self::DuplicateAppointment => "duplicate_appointment",
            Self::SchedulingClash { .. } => "scheduling_clash",
            Self::NotInDisplayedList(_) => "not_in_displayed_list",
            Self::NoFieldEdited => "no_field_edited",
            Self::Store(_) => "store",
            Self::Storage(_) => "storage",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "No person named {name} exists in the address book."),
            Self::AppointmentNotFound(id) => {
                write!(f, "The appointment with id {id} could not be found.")
            }
            Self::NoSuchPerson(name) => write!(f, "No client found with the name: {name}"),
            Self::AmbiguousMatch(names) => {
                f.write_str("Multiple persons match that name, please be more specific: ")?;
                for (index, name) in names.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}")?;
                }
                Ok(())
            }
            Self::DuplicatePerson => f.write_str("This person already exists in the address book."),
            Self::DuplicateAppointment => {
                f.write_str("This appointment already exists in the address book.")
            }
            Self::SchedulingClash {
                existing_id,
                existing_time,
                candidate_time,
            } => write!(
                f,
                "This appointment at {candidate_time} clashes with confirmed appointment \
                 {existing_id} at {existing_time}."
            ),
            Self::NotInDisplayedList(name) => write!(
                f,
                "{name} is not in the displayed list. Clear the current filter with `list` first."
            ),
            Self::NoFieldEdited => f.write_str("At least one field to edit must be provided."),
            Self::Store(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "Could not save the address book: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateAppointment => Self::DuplicateAppointment,
            other => Self::Store(other),
        }
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError, FindRequest};
    use crate::model::appointment::AppointmentId;
    use crate::model::datetime::AppointmentDateTime;
    use crate::model::value::Name;
    use crate::store::StoreError;

    #[test]
    fn ambiguous_match_lists_every_name() {
        let err = CommandError::AmbiguousMatch(vec![
            Name::parse("John Doe").unwrap(),
            Name::parse("john doe").unwrap(),
        ]);
        assert!(err.to_string().ends_with("John Doe, john doe"));
    }

    #[test]
    fn clash_message_names_both_times_and_existing_id() {
        let err = CommandError::SchedulingClash {
            existing_id: AppointmentId::parse("a1b2c3d").unwrap(),
            existing_time: AppointmentDateTime::parse("12-10-2025 1430").unwrap(),
            candidate_time: AppointmentDateTime::parse("12-10-2025 1500").unwrap(),
        };
        let message = err.to_string();
        assert!(message.contains("a1b2c3d"));
        assert!(message.contains("12-10-2025 1430"));
        assert!(message.contains("12-10-2025 1500"));
    }

    #[test]
    fn store_duplicate_maps_to_duplicate_appointment() {
        let err = CommandError::from(StoreError::DuplicateAppointment);
        assert!(matches!(err, CommandError::DuplicateAppointment));
        assert_eq!(err.code(), "duplicate_appointment");
    }

    #[test]
    fn command_names_are_stable_log_labels() {
        assert_eq!(Command::List.name(), "list");
        assert_eq!(Command::Find(FindRequest::default()).name(), "find");
        assert_eq!(Command::Clear.name(), "clear");
    }
}
