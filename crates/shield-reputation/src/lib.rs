//! SybilShield Reputation Engine
//!
//! Per-account weighted, time-decayed multi-category trust score:
//! - Six score categories with configurable weights
//! - Compound decay applied per elapsed period, identically on the write
//!   path and the decay-aware read path
//! - Bounded, FIFO-evicted score history
//! - Verification level fed from the identity verification machine

pub mod config;
pub mod engine;
pub mod error;
pub mod record;

pub use config::ReputationConfig;
pub use engine::{ReputationEngine, VerificationStatusSource};
pub use error::ReputationError;
pub use record::{Category, CategoryScore, HistoryEntry, ReputationRecord, MAX_HISTORY};
