//! Client (person) record.
//!
//! # Invariants
//! - Identity is the full name, compared case-sensitively.
//! - `appointment_ids` is a non-owning back-reference maintained by the
//!   store; appointments themselves live in the store's appointment list.

use super::appointment::AppointmentId;
use super::value::{Address, Email, Name, Phone, Rank, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: Name,
    pub phone: Phone,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    /// Owned appointments in link order.
    #[serde(default)]
    pub appointment_ids: Vec<AppointmentId>,
}

impl Person {
    /// Creates a person with only the required fields set.
    pub fn new(name: Name, phone: Phone) -> Self {
        Self {
            name,
            phone,
            email: None,
            address: None,
            rank: Rank::default(),
            tags: BTreeSet::new(),
            appointment_ids: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Person identity check: exact name equality.
    pub fn is_same_person(&self, other: &Person) -> bool {
        self.name == other.name
    }

    pub fn owns_appointment(&self, id: &AppointmentId) -> bool {
        self.appointment_ids.contains(id)
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; Phone: {}", self.name, self.phone)?;
        if let Some(email) = &self.email {
            write!(f, "; Email: {email}")?;
        }
        if let Some(address) = &self.address {
            write!(f, "; Address: {address}")?;
        }
        write!(f, "; Rank: {}", self.rank)?;
        if !self.tags.is_empty() {
            f.write_str("; Tags: ")?;
            for tag in &self.tags {
                write!(f, "[{tag}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Person;
    use crate::model::value::{Address, Email, Name, Phone, Rank, Tag};

    #[test]
    fn display_lists_present_fields_in_order() {
        let person = Person::new(Name::parse("Alex Wu").unwrap(), Phone::parse("91234567").unwrap())
            .with_email(Email::parse("alex@example.com").unwrap())
            .with_address(Address::parse("Bukit Merah").unwrap())
            .with_rank(Rank::Urgent)
            .with_tags([Tag::parse("vip").unwrap(), Tag::parse("friends").unwrap()]);

        assert_eq!(
            person.to_string(),
            "Alex Wu; Phone: 91234567; Email: alex@example.com; Address: Bukit Merah; \
             Rank: urgent; Tags: [friends][vip]"
        );
    }

    #[test]
    fn identity_is_case_sensitive_name() {
        let upper = Person::new(Name::parse("John Doe").unwrap(), Phone::parse("123").unwrap());
        let lower = Person::new(Name::parse("john doe").unwrap(), Phone::parse("123").unwrap());
        let other_phone =
            Person::new(Name::parse("John Doe").unwrap(), Phone::parse("999").unwrap());
        assert!(!upper.is_same_person(&lower));
        assert!(upper.is_same_person(&other_phone));
    }

    #[test]
    fn deserialize_defaults_optional_fields() {
        let value = serde_json::json!({ "name": "Alex Wu", "phone": "91234567" });
        let person: Person = serde_json::from_value(value).unwrap();
        assert_eq!(person.rank, Rank::Unranked);
        assert!(person.tags.is_empty());
        assert!(person.appointment_ids.is_empty());
    }
}
