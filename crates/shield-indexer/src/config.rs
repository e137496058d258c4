use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::record::IndexerType;

/// Feeder-registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Minimum seconds between syncs per feeder.
    pub sync_interval_secs: u64,
    /// Maximum target addresses per submission.
    pub max_targets_per_submission: usize,
    /// Whether submissions are counted as processed.
    pub data_processing_enabled: bool,
    /// Feeder types auto-enrolled in the authorized set on registration.
    pub auto_authorized_types: HashSet<IndexerType>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        let mut auto_authorized_types = HashSet::new();
        auto_authorized_types.insert(IndexerType::Transaction);
        auto_authorized_types.insert(IndexerType::Account);
        Self {
            sync_interval_secs: 300,
            max_targets_per_submission: 50,
            data_processing_enabled: true,
            auto_authorized_types,
        }
    }
}
