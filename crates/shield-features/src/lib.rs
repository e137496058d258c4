//! SybilShield Feature Store
//!
//! Role-gated per-account feature maps feeding the detection pipeline:
//! - Extractors write `(kind, name) → value` entries, singly or in batches
//! - Batch writes can collapse into one aggregate event to bound event
//!   volume under high-frequency extraction
//! - Reads return zero/absent defaults instead of failing
//! - A catalog of well-known feature names keeps extractors and scorers
//!   agreeing on keys

pub mod config;
pub mod error;
pub mod names;
pub mod store;

pub use config::FeatureConfig;
pub use error::FeatureError;
pub use store::{AccountFeatures, FeatureEntry, FeatureKind, FeatureStore};
