//! Full record-store snapshot exchanged with persistence.

use super::appointment::Appointment;
use super::person::Person;
use serde::{Deserialize, Serialize};

/// Ordered person and appointment lists.
///
/// Persistence only ever loads or saves whole snapshots; there is no
/// incremental write path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.appointments.is_empty()
    }
}
