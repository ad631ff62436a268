//! Query predicates for find, delete resolution and clash detection.
//!
//! # Responsibility
//! - Test persons and appointments against optional criteria.
//! - Keep match semantics out of the store and the command layer.
//!
//! # Invariants
//! - A query result is the AND of every present field test.
//! - An empty query matches every candidate.

pub mod appointment_query;
pub mod person_query;
pub mod range;

pub use appointment_query::AppointmentQuery;
pub use person_query::{PersonMatchPolicy, PersonQuery};
pub use range::{DateTimeRangeQuery, DATE_TIME_QUERY_CONSTRAINTS};
