//! # relance-shared
//!
//! Domain types and pure logic for the Relance follow-up assistant.
//!
//! Holds the conversation snapshot types, the staleness classifier,
//! quiet-hours checks, the context/prompt builders for the external
//! drafting model, and runtime configuration.  Reading the Messages
//! database lives in `relance-store`; this crate never touches SQLite.

pub mod config;
pub mod constants;
pub mod draft;
pub mod models;
pub mod triage;

pub use config::Config;
pub use models::*;
pub use triage::{StaleConversation, StaleDetector};
