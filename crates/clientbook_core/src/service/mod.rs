//! Core use-case services.
//!
//! # Responsibility
//! - Turn typed commands into record-store operations.
//! - Convert every failure into a user-facing [`CommandError`].
//!
//! # Invariants
//! - Errors stop at this boundary; nothing here panics on user input.

pub mod client_service;
pub mod command;
pub mod descriptor;

pub use client_service::ClientService;
pub use command::{
    AffectedEntity, Command, CommandError, CommandOutcome, CommandResult, FindRequest,
    LinkCreateRequest, ServiceResult,
};
pub use descriptor::{EditAppointmentDescriptor, EditPersonDescriptor};
