//! JSON-file snapshot repository.
//!
//! # Invariants
//! - Writes go to a sibling temp file that is renamed over the target, so a
//!   crash never leaves a half-written snapshot.
//! - A missing file loads as `None`.

use super::{RepoResult, SnapshotRepository};
use crate::logging::STORAGE_TARGET;
use crate::model::snapshot::Snapshot;
use log::{error, info};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    path: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    fn write(&self, snapshot: &Snapshot) -> RepoResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(snapshot)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, body)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load_snapshot(&self) -> RepoResult<Option<Snapshot>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        info!(
            target: STORAGE_TARGET,
            "event=snapshot_load module=repo status=ok backend=json persons={} appointments={}",
            snapshot.persons.len(),
            snapshot.appointments.len()
        );
        Ok(Some(snapshot))
    }

    fn save_snapshot(&mut self, snapshot: &Snapshot) -> RepoResult<()> {
        let started_at = Instant::now();
        match self.write(snapshot) {
            Ok(()) => {
                info!(
                    target: STORAGE_TARGET,
                    "event=snapshot_save module=repo status=ok backend=json persons={} appointments={} duration_ms={}",
                    snapshot.persons.len(),
                    snapshot.appointments.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    target: STORAGE_TARGET,
                    "event=snapshot_save module=repo status=error backend=json duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JsonSnapshotRepository;
    use std::path::Path;

    #[test]
    fn temp_path_is_a_sibling() {
        let repo = JsonSnapshotRepository::new("/data/clientbook.json");
        assert_eq!(repo.temp_path(), Path::new("/data/clientbook.json.tmp"));
    }
}
