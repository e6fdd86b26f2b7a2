//! # relance-store
//!
//! Read-only access to the local iMessage history for the Relance
//! follow-up assistant.
//!
//! The crate never writes.  Every operation opens a short-lived read-only
//! connection against the live `chat.db` that Messages keeps updating,
//! resolves message text out of rich-text blobs when the plain column is
//! empty, and maps sender handles to AddressBook names.

pub mod chats;
pub mod contacts;
pub mod messages;
pub mod store;
pub mod text;
pub mod timestamp;

mod error;

pub use contacts::{normalize_identifier, normalize_phone, ContactBook};
pub use error::StoreError;
pub use store::MessageStore;
