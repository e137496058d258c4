//! SybilShield Feeder Registry
//!
//! Registration and bookkeeping for the external data feeders that supply
//! detection signals:
//! - Registration with optional auto-enrollment in the authorized set
//! - Idempotent admin activation/deactivation
//! - Bounded data submissions with per-feeder statistics
//! - Rate-limited sync against a configurable interval

pub mod config;
pub mod error;
pub mod record;
pub mod registry;

pub use config::IndexerConfig;
pub use error::IndexerError;
pub use record::{DataKind, IndexerRecord, IndexerType, SubmissionStats};
pub use registry::IndexerRegistry;
