//! Client book domain model.
//!
//! # Responsibility
//! - Define validated value types used by every other layer.
//! - Define the `Person` and `Appointment` records and the snapshot shape
//!   exchanged with persistence.
//!
//! # Invariants
//! - Value types can only be constructed through validating parsers.
//! - Deserialization re-runs the same validation as construction.

pub mod appointment;
pub mod datetime;
pub mod person;
pub mod snapshot;
pub mod value;
