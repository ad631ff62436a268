//! Core domain logic for the client book.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod settings;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_settings, logging_status};
pub use model::appointment::{
    Appointment, AppointmentId, AppointmentLength, AppointmentLocation, AppointmentMessage,
    AppointmentStatus, AppointmentType,
};
pub use model::datetime::AppointmentDateTime;
pub use model::person::Person;
pub use model::snapshot::Snapshot;
pub use model::value::{Address, Email, Name, Phone, Rank, Tag, ValidationError};
pub use repo::{
    JsonSnapshotRepository, RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository,
};
pub use search::{AppointmentQuery, DateTimeRangeQuery, PersonMatchPolicy, PersonQuery};
pub use service::{
    ClientService, Command, CommandError, CommandOutcome, CommandResult, EditAppointmentDescriptor,
    EditPersonDescriptor, FindRequest, LinkCreateRequest,
};
pub use settings::{load_settings, CoreSettings, SettingsError, StorageKind};
pub use store::{AddressBook, ClientView, StoreError, ViewMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
