//! Core configuration loading.
//!
//! # Responsibility
//! - Describe storage, logging and delete-matching options.
//! - Load them from an optional JSON file with per-field defaults.
//!
//! # Invariants
//! - A missing settings file yields defaults; a malformed one is an error.
//! - Unknown keys are rejected so typos do not silently fall back.

use crate::logging::{default_log_level, normalize_level};
use crate::search::PersonMatchPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEFAULT_SQLITE_FILE: &str = "clientbook.db";
const DEFAULT_JSON_FILE: &str = "clientbook.json";

/// Snapshot storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Json,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreSettings {
    /// Snapshot location. Defaults to a backend-specific file name in the
    /// working directory.
    pub data_path: Option<PathBuf>,
    pub storage: StorageKind,
    /// Defaults to [`default_log_level`].
    pub log_level: Option<String>,
    /// Absolute log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub delete_match_policy: PersonMatchPolicy,
}

impl CoreSettings {
    pub fn data_path(&self) -> PathBuf {
        match (&self.data_path, self.storage) {
            (Some(path), _) => path.clone(),
            (None, StorageKind::Sqlite) => PathBuf::from(DEFAULT_SQLITE_FILE),
            (None, StorageKind::Json) => PathBuf::from(DEFAULT_JSON_FILE),
        }
    }

    pub fn log_level(&self) -> &str {
        match &self.log_level {
            Some(level) => level.as_str(),
            None => default_log_level(),
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        normalize_level(self.log_level()).map_err(SettingsError::Invalid)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(SettingsError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read settings `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid settings `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid settings: {message}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Loads settings from `path`, returning defaults when the file is absent.
pub fn load_settings(path: impl AsRef<Path>) -> Result<CoreSettings, SettingsError> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(CoreSettings::default()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_settings(&text).map_err(|err| match err {
        SettingsError::Parse { source, .. } => SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses settings JSON text.
pub fn parse_settings(text: &str) -> Result<CoreSettings, SettingsError> {
    let settings: CoreSettings =
        serde_json::from_str(text).map_err(|source| SettingsError::Parse {
            path: PathBuf::new(),
            source,
        })?;
    settings.validate()?;
    Ok(settings)
}
