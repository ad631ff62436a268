//! In-memory record store.
//!
//! # Responsibility
//! - Own person and appointment collections behind one aggregate.
//! - Track what the user currently sees through [`ClientView`].
//!
//! # See also
//! - `service::client_service` for the command layer driving this store.

pub mod address_book;
pub mod unique_list;
pub mod view;

pub use address_book::{AddressBook, StoreError, StoreResult, MAX_ID_ATTEMPTS};
pub use unique_list::{CollectionError, UniqueList};
pub use view::{ClientView, ViewMode};
