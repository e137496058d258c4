use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::record::Category;

/// Reputation-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Aggregation weight per category (0-100 each).
    pub category_weights: HashMap<Category, u8>,
    /// Length of one decay period, in seconds.
    pub decay_period_secs: u64,
    /// Per-period decay percentage applied to new registrations.
    pub default_decay_rate: u8,
    /// System-wide minimum score used by threshold checks.
    pub min_threshold: u8,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        let mut category_weights = HashMap::new();
        category_weights.insert(Category::TransactionHistory, 25);
        category_weights.insert(Category::CommunityParticipation, 15);
        category_weights.insert(Category::VerificationLevel, 30);
        category_weights.insert(Category::Longevity, 10);
        category_weights.insert(Category::NetworkActivity, 15);
        category_weights.insert(Category::GovernanceParticipation, 5);
        Self {
            category_weights,
            // 30 days
            decay_period_secs: 2_592_000,
            default_decay_rate: 5,
            min_threshold: 40,
        }
    }
}
