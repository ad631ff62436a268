//! Snapshot persistence contracts and implementations.
//!
//! # Responsibility
//! - Load and save the full record-store snapshot.
//! - Keep storage encoding out of the store and command layers.
//!
//! # Invariants
//! - Saves replace the whole persisted state; there is no partial write.
//! - Read paths re-validate every value and reject invalid persisted state
//!   instead of masking it.
//! - `load_snapshot` returns `None` when nothing has been persisted yet.

use crate::db::DbError;
use crate::model::snapshot::Snapshot;
use crate::model::value::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_repo;
pub mod snapshot_repo;

pub use json_repo::JsonSnapshotRepository;
pub use snapshot_repo::SqliteSnapshotRepository;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Validation(ValidationError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid snapshot json: {err}"),
            Self::Validation(err) => write!(f, "invalid persisted value: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not initialized; expected schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Whole-snapshot persistence boundary.
pub trait SnapshotRepository {
    /// Loads the persisted snapshot, or `None` when nothing was saved yet.
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>>;
    /// Replaces the persisted state with `snapshot`.
    fn save_snapshot(&mut self, snapshot: &Snapshot) -> RepoResult<()>;
}

impl<R: SnapshotRepository + ?Sized> SnapshotRepository for Box<R> {
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&mut self, snapshot: &Snapshot) -> RepoResult<()> {
        (**self).save_snapshot(snapshot)
    }
}
