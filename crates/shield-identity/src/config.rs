use serde::{Deserialize, Serialize};

/// Identity-verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// How long an approval stays valid, in seconds.
    pub validity_period_secs: u64,
    /// Maximum verification attempts per account.
    pub max_attempts: u32,
    /// Mandatory wait after a rejection before re-requesting, in seconds.
    pub cooldown_period_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            // 30 days
            validity_period_secs: 2_592_000,
            max_attempts: 3,
            // 24 hours
            cooldown_period_secs: 86_400,
        }
    }
}
