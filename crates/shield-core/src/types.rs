use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for every score, weight, and confidence value in the system.
pub const MAX_SCORE: u8 = 100;

/// Check that a value is inside the shared `0..=100` score domain.
pub fn in_score_range(value: u8) -> bool {
    value <= MAX_SCORE
}

/// Stable identifier addressing all per-account records.
///
/// Each component keeps at most one record per key. Keys are opaque to this
/// layer; callers typically use ledger addresses (`0x`-prefixed hex), but any
/// non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountKey(String);

impl AccountKey {
    /// Create a new account key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The underlying key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for AccountKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
