//! SybilShield Authorization Layer
//!
//! Admin-controlled capability sets consulted by every other component:
//! - `RoleRegistry` holds the per-role allow-lists
//! - `Authorization` is the single interface the other crates consume
//! - Revoking the last admin is rejected so configuration can never be
//!   permanently locked

pub mod error;
pub mod roles;

pub use error::AuthzError;
pub use roles::{Authorization, RoleKind, RoleRegistry};
