//! Ordered collection with an explicit duplicate-identity rule.
//!
//! # Responsibility
//! - Reject adds that collide with an existing entity's identity.
//! - Replace and remove entries located by record identity.
//!
//! # Invariants
//! - No two stored entries satisfy `same_identity`.
//! - Insertion order is preserved; `set` keeps the replaced entry's slot.
//!
//! Identity (for duplicate checks) and record lookup (for replace/remove)
//! are separate comparison functions because appointments use a looser
//! identity than their record key.

use crate::model::appointment::Appointment;
use crate::model::person::Person;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Entity comparison used by [`UniqueList`].
pub type SameFn<T> = fn(&T, &T) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    DuplicateEntity { kind: &'static str },
    EntityNotFound { kind: &'static str },
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEntity { kind } => write!(f, "operation would result in duplicate {kind}s"),
            Self::EntityNotFound { kind } => write!(f, "{kind} not found in collection"),
        }
    }
}

impl Error for CollectionError {}

#[derive(Clone)]
pub struct UniqueList<T> {
    kind: &'static str,
    items: Vec<T>,
    same_identity: SameFn<T>,
    same_record: SameFn<T>,
}

impl UniqueList<Person> {
    /// Persons: identity and record lookup are both exact name equality.
    pub fn persons() -> Self {
        Self::new("person", Person::is_same_person, Person::is_same_person)
    }
}

impl UniqueList<Appointment> {
    /// Appointments: identity is `(client_name, date_time, status)`,
    /// record lookup is the identifier.
    pub fn appointments() -> Self {
        Self::new(
            "appointment",
            Appointment::is_same_appointment,
            Appointment::is_same_record,
        )
    }
}

impl<T> UniqueList<T> {
    pub fn new(kind: &'static str, same_identity: SameFn<T>, same_record: SameFn<T>) -> Self {
        Self {
            kind,
            items: Vec::new(),
            same_identity,
            same_record,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Whether an identity-equal entity is stored.
    pub fn contains(&self, entity: &T) -> bool {
        self.items
            .iter()
            .any(|existing| (self.same_identity)(existing, entity))
    }

    /// First stored entity satisfying `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn add(&mut self, entity: T) -> Result<(), CollectionError> {
        if self.contains(&entity) {
            return Err(self.duplicate());
        }
        self.items.push(entity);
        Ok(())
    }

    /// Replaces the entry located by record identity with `replacement`.
    ///
    /// # Errors
    /// - `EntityNotFound` when `target` is absent.
    /// - `DuplicateEntity` when `replacement` is identity-equal to any
    ///   other stored entry.
    pub fn set(&mut self, target: &T, replacement: T) -> Result<(), CollectionError> {
        let index = self.position_of(target).ok_or_else(|| self.not_found())?;
        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && (self.same_identity)(existing, &replacement));
        if collides {
            return Err(self.duplicate());
        }
        self.items[index] = replacement;
        Ok(())
    }

    /// Removes and returns the entry located by record identity.
    pub fn remove(&mut self, target: &T) -> Result<T, CollectionError> {
        let index = self.position_of(target).ok_or_else(|| self.not_found())?;
        Ok(self.items.remove(index))
    }

    /// Replaces all contents. Rejects input containing identity duplicates
    /// and leaves the list untouched in that case.
    pub fn set_all(&mut self, items: Vec<T>) -> Result<(), CollectionError> {
        for (i, left) in items.iter().enumerate() {
            if items[i + 1..]
                .iter()
                .any(|right| (self.same_identity)(left, right))
            {
                return Err(self.duplicate());
            }
        }
        self.items = items;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Mutable access for updates that do not touch identity fields.
    pub(crate) fn find_mut(&mut self, predicate: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|item| predicate(item))
    }

    fn position_of(&self, target: &T) -> Option<usize> {
        self.items
            .iter()
            .position(|existing| (self.same_record)(existing, target))
    }

    fn duplicate(&self) -> CollectionError {
        CollectionError::DuplicateEntity { kind: self.kind }
    }

    fn not_found(&self) -> CollectionError {
        CollectionError::EntityNotFound { kind: self.kind }
    }
}

impl<T: Debug> Debug for UniqueList<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueList")
            .field("kind", &self.kind)
            .field("items", &self.items)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a UniqueList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
