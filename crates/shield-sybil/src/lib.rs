//! SybilShield Risk Registry
//!
//! Per-account risk state for detecting coordinated/fake accounts:
//! - Risk profiles with a bounded, FIFO-evicted factor history
//! - Direct score updates from authorized scoring services
//! - Flagging against a configurable threshold
//! - Risk-level bands for coarse classification

pub mod config;
pub mod error;
pub mod profile;
pub mod registry;

pub use config::{RiskBands, SybilConfig};
pub use error::SybilError;
pub use profile::{FactorKind, RiskFactor, RiskLevel, RiskProfile, RiskStatus, MAX_RISK_FACTORS};
pub use registry::{RiskDetails, SybilRiskRegistry};
