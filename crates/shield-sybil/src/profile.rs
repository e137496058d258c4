use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::config::RiskBands;

/// Maximum number of risk factors retained per account.
pub const MAX_RISK_FACTORS: usize = 20;

/// Signal families that contribute context to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    /// Suspicious transaction patterns (burst sends, fan-out, round amounts).
    TransactionPattern,
    /// Correlation with known address clusters.
    AddressClustering,
    /// Anomalous timing (synchronized activity, improbable regularity).
    TemporalAnomaly,
    /// Graph-position signals (centrality, shared counterparties).
    NetworkTopology,
}

impl FactorKind {
    /// All factor kinds.
    pub fn all() -> [FactorKind; 4] {
        [
            Self::TransactionPattern,
            Self::AddressClustering,
            Self::TemporalAnomaly,
            Self::NetworkTopology,
        ]
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionPattern => write!(f, "TransactionPattern"),
            Self::AddressClustering => write!(f, "AddressClustering"),
            Self::TemporalAnomaly => write!(f, "TemporalAnomaly"),
            Self::NetworkTopology => write!(f, "NetworkTopology"),
        }
    }
}

/// One audit-trail entry contributing context to a risk score.
///
/// Factors are retained for audit only; the profile score is set directly by
/// the reporting service and is not recomputed from this history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    /// The signal family.
    pub kind: FactorKind,
    /// Factor score (0-100).
    pub score: u8,
    /// Reporter confidence in the factor (0-100).
    pub confidence: u8,
    /// When the factor was reported.
    pub timestamp: DateTime<Utc>,
}

/// Verification standing recorded on a risk profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    /// No verification recorded.
    Unverified,
    /// Identity verified.
    Verified,
    /// Flagged as a likely coordinated/fake account.
    Flagged,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => write!(f, "Unverified"),
            Self::Verified => write!(f, "Verified"),
            Self::Flagged => write!(f, "Flagged"),
        }
    }
}

/// Coarse risk classification derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below the medium band floor.
    Low,
    /// At or above the medium band floor.
    Medium,
    /// At or above the high band floor.
    High,
}

impl RiskLevel {
    /// Classify a score against the configured band floors.
    pub fn from_score(score: u8, bands: &RiskBands) -> Self {
        if score >= bands.high_floor {
            Self::High
        } else if score >= bands.medium_floor {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Per-account risk state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Current risk score (0-100).
    pub score: u8,
    /// Bounded factor history, oldest evicted first.
    pub factors: VecDeque<RiskFactor>,
    /// Verification standing.
    pub status: RiskStatus,
    /// Last mutation timestamp.
    pub last_updated: DateTime<Utc>,
}

impl RiskProfile {
    /// Create an empty profile (score 0, unverified).
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            score: 0,
            factors: VecDeque::new(),
            status: RiskStatus::Unverified,
            last_updated: now,
        }
    }

    /// Append a factor, evicting the oldest when at capacity.
    pub fn push_factor(&mut self, factor: RiskFactor) {
        if self.factors.len() == MAX_RISK_FACTORS {
            self.factors.pop_front();
        }
        self.factors.push_back(factor);
    }
}
