//! SybilShield Core
//!
//! Shared building blocks for the SybilShield trust-state layer:
//! - Account keys addressing all per-account records
//! - Score bounds shared by every scoring component
//! - Error classification consumed by the external API layer
//! - Structured trust events and the in-memory event log
//! - TOML config loading helpers

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::ConfigError;
pub use error::{Classify, ErrorClass};
pub use events::{EventSink, MemoryEventLog, TrustEvent};
pub use types::{AccountKey, MAX_SCORE};
