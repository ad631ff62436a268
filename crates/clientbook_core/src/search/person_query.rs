//! Person filter and name-target matching policy.

use crate::model::person::Person;
use crate::model::value::{Email, Name, Phone, Rank, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Optional-per-field person filter.
///
/// Name keywords use OR semantics: a person matches when any keyword is a
/// case-insensitive substring of the full name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonQuery {
    name_keywords: Option<BTreeSet<String>>,
    phone: Option<Phone>,
    email: Option<Email>,
    tags: BTreeSet<Tag>,
    rank: Option<Rank>,
}

impl PersonQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets name keywords. Blank keywords are dropped; an all-blank input
    /// leaves the name test unset.
    pub fn with_name_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect::<BTreeSet<_>>();
        self.name_keywords = (!keywords.is_empty()).then_some(keywords);
        self
    }

    /// Uses every whitespace-separated token of `name` as a keyword.
    pub fn with_name(self, name: &Name) -> Self {
        self.with_name_keywords(name.as_str().split_whitespace())
    }

    pub fn with_phone(mut self, phone: Phone) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_keywords.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.tags.is_empty()
            && self.rank.is_none()
    }

    pub fn matches(&self, person: &Person) -> bool {
        self.matches_name(person)
            && self.phone.as_ref().map_or(true, |phone| &person.phone == phone)
            && self
                .email
                .as_ref()
                .map_or(true, |email| person.email.as_ref() == Some(email))
            && self.tags.is_subset(&person.tags)
            && self.rank.map_or(true, |rank| person.rank == rank)
    }

    fn matches_name(&self, person: &Person) -> bool {
        let Some(keywords) = &self.name_keywords else {
            return true;
        };
        let name = person.name.as_str().to_lowercase();
        keywords.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

/// How a delete-by-name target is matched against stored persons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonMatchPolicy {
    /// Case-sensitive full-name equality.
    #[default]
    ExactName,
    /// Case-insensitive substring of the stored name.
    ContainsIgnoreCase,
}

impl PersonMatchPolicy {
    pub fn matches(self, candidate: &Name, target: &Name) -> bool {
        match self {
            Self::ExactName => candidate == target,
            Self::ContainsIgnoreCase => candidate.contains_ignore_case(target),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactName => "exact_name",
            Self::ContainsIgnoreCase => "contains_ignore_case",
        }
    }
}
