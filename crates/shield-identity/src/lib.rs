//! SybilShield Identity Verification
//!
//! Per-account verification state machine:
//! - Requests move an account into Pending
//! - Allow-listed verifiers approve (Verified, with expiry) or reject
//! - Rejected accounts wait out a cooldown before re-requesting
//! - Expiry is derived at read time, never stored as a state
//! - A configurable attempt cap bounds repeated requests

pub mod config;
pub mod error;
pub mod machine;
pub mod record;

pub use config::VerificationConfig;
pub use error::IdentityError;
pub use machine::IdentityVerificationMachine;
pub use record::{IdentityRecord, VerificationState, VerificationStatus, VerificationType};
