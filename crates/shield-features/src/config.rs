use serde::{Deserialize, Serialize};

/// Feature-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// When true, a batch write emits one aggregate event carrying only a
    /// count instead of one event per entry.
    pub batch_events_enabled: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            batch_events_enabled: true,
        }
    }
}
