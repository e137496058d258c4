use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::profile::FactorKind;

/// Score floors for the medium and high risk bands.
///
/// The defaults mirror the detection pipeline's 0.5/0.8 probability cutoffs,
/// scaled to the 0-100 score domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBands {
    /// Scores at or above this floor classify as Medium.
    pub medium_floor: u8,
    /// Scores at or above this floor classify as High.
    pub high_floor: u8,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            medium_floor: 50,
            high_floor: 80,
        }
    }
}

/// Risk-registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SybilConfig {
    /// Scores at or above this threshold flag the account.
    pub risk_threshold: u8,
    /// Whether identity verification is required before participation.
    pub verification_required: bool,
    /// Factor kinds accepted by `update_risk_score`.
    pub enabled_factor_kinds: HashSet<FactorKind>,
    /// Band floors for coarse risk classification.
    pub bands: RiskBands,
}

impl Default for SybilConfig {
    fn default() -> Self {
        Self {
            risk_threshold: 70,
            verification_required: false,
            enabled_factor_kinds: FactorKind::all().into_iter().collect(),
            bands: RiskBands::default(),
        }
    }
}
