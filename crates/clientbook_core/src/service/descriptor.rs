//! Sparse edit payloads.
//!
//! Each descriptor holds one optional value per editable field; unset fields
//! keep the current value. The merge lives in a single `apply_to` per type.

use crate::model::appointment::{
    Appointment, AppointmentLength, AppointmentLocation, AppointmentMessage, AppointmentStatus,
    AppointmentType,
};
use crate::model::datetime::AppointmentDateTime;
use crate::model::person::Person;
use crate::model::value::{Address, Email, Name, Phone, Rank, Tag};
use std::collections::BTreeSet;

/// Appointment edit. Id and client are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditAppointmentDescriptor {
    pub date_time: Option<AppointmentDateTime>,
    pub length: Option<AppointmentLength>,
    pub location: Option<AppointmentLocation>,
    pub kind: Option<AppointmentType>,
    pub message: Option<AppointmentMessage>,
    pub status: Option<AppointmentStatus>,
}

impl EditAppointmentDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.date_time.is_some()
            || self.length.is_some()
            || self.location.is_some()
            || self.kind.is_some()
            || self.message.is_some()
            || self.status.is_some()
    }

    pub fn apply_to(&self, current: &Appointment) -> Appointment {
        Appointment {
            id: current.id.clone(),
            client_name: current.client_name.clone(),
            date_time: self.date_time.unwrap_or(current.date_time),
            length: self.length.unwrap_or(current.length),
            location: self.location.clone().unwrap_or_else(|| current.location.clone()),
            kind: self.kind.clone().unwrap_or_else(|| current.kind.clone()),
            message: self.message.clone().unwrap_or_else(|| current.message.clone()),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Person edit. Appointment back-references are owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPersonDescriptor {
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub rank: Option<Rank>,
    /// Replaces the whole tag set.
    pub tags: Option<BTreeSet<Tag>>,
}

impl EditPersonDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.rank.is_some()
            || self.tags.is_some()
    }

    pub fn apply_to(&self, current: &Person) -> Person {
        Person {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
            email: self.email.clone().or_else(|| current.email.clone()),
            address: self.address.clone().or_else(|| current.address.clone()),
            rank: self.rank.unwrap_or(current.rank),
            tags: self.tags.clone().unwrap_or_else(|| current.tags.clone()),
            appointment_ids: current.appointment_ids.clone(),
        }
    }
}
