//! Integration-test crate for the SybilShield workspace.
//!
//! The library is intentionally empty; the scenarios live in `tests/`.
