use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use shield_authz::Authorization;
use shield_core::events::{Detection, TrustEvent};
use shield_core::types::in_score_range;
use shield_core::{AccountKey, EventSink};

use crate::config::SybilConfig;
use crate::error::SybilError;
use crate::profile::{FactorKind, RiskFactor, RiskLevel, RiskProfile, RiskStatus};

/// Read-side summary of a risk profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDetails {
    /// Current risk score.
    pub score: u8,
    /// Verification standing.
    pub status: RiskStatus,
    /// Last mutation timestamp.
    pub last_updated: DateTime<Utc>,
}

/// Per-account risk registry.
///
/// Mutations are validated fully before any field is written; operations on
/// one account are linearized by the profile map's entry guard.
pub struct SybilRiskRegistry {
    profiles: DashMap<AccountKey, RiskProfile>,
    config: RwLock<SybilConfig>,
    authz: Arc<dyn Authorization>,
    events: Arc<dyn EventSink>,
}

impl SybilRiskRegistry {
    /// Create a registry with the given configuration.
    pub fn new(
        authz: Arc<dyn Authorization>,
        config: SybilConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            profiles: DashMap::new(),
            config: RwLock::new(config),
            authz,
            events,
        }
    }

    /// Register an account with an empty profile (score 0, unverified).
    pub fn register(&self, account: &AccountKey) -> Result<(), SybilError> {
        match self.profiles.entry(account.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SybilError::AlreadyRegistered(account.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(RiskProfile::new(Utc::now()));
                tracing::debug!(account = %account, "risk profile registered");
                Ok(())
            }
        }
    }

    /// Update an account's risk score and append one factor to its history.
    ///
    /// The score is set directly to `new_score`; the factor history is
    /// retained for audit and is not folded back into the score. The account
    /// is flagged when `new_score` reaches the configured threshold.
    pub fn update_risk_score(
        &self,
        caller: &AccountKey,
        target: &AccountKey,
        new_score: u8,
        factor_kind: FactorKind,
        factor_score: u8,
        factor_confidence: u8,
    ) -> Result<(), SybilError> {
        self.update_risk_score_at(
            caller,
            target,
            new_score,
            factor_kind,
            factor_score,
            factor_confidence,
            Utc::now(),
        )
    }

    /// [`update_risk_score`](Self::update_risk_score) with an explicit
    /// timestamp, for replay and backfill.
    pub fn update_risk_score_at(
        &self,
        caller: &AccountKey,
        target: &AccountKey,
        new_score: u8,
        factor_kind: FactorKind,
        factor_score: u8,
        factor_confidence: u8,
        now: DateTime<Utc>,
    ) -> Result<(), SybilError> {
        if !self.authz.is_service_authorized(caller) {
            return Err(SybilError::UnauthorizedService(caller.clone()));
        }

        let threshold = {
            let config = self.config.read().expect("sybil config poisoned");
            if !config.enabled_factor_kinds.contains(&factor_kind) {
                return Err(SybilError::FactorKindDisabled(factor_kind));
            }
            config.risk_threshold
        };

        for (field, value) in [
            ("risk score", new_score),
            ("factor score", factor_score),
            ("factor confidence", factor_confidence),
        ] {
            if !in_score_range(value) {
                return Err(SybilError::ScoreOutOfRange { field, value });
            }
        }

        let flagged = {
            let mut profile = self
                .profiles
                .get_mut(target)
                .ok_or_else(|| SybilError::NotRegistered(target.clone()))?;

            profile.push_factor(RiskFactor {
                kind: factor_kind,
                score: factor_score,
                confidence: factor_confidence,
                timestamp: now,
            });
            profile.score = new_score;
            let flagged = new_score >= threshold;
            if flagged {
                profile.status = RiskStatus::Flagged;
            }
            profile.last_updated = now;
            flagged
        };

        tracing::debug!(
            target = %target,
            score = new_score,
            factor = %factor_kind,
            flagged,
            "risk score updated"
        );

        self.events.emit(TrustEvent::Detection(Detection {
            id: TrustEvent::new_id(),
            subject: target.clone(),
            score: new_score,
            flagged,
            reported_by: caller.clone(),
            timestamp: now,
        }));

        Ok(())
    }

    /// Directly override an account's verification standing.
    pub fn set_verification_status(
        &self,
        caller: &AccountKey,
        target: &AccountKey,
        status: RiskStatus,
    ) -> Result<(), SybilError> {
        if !self.authz.is_service_authorized(caller) {
            return Err(SybilError::UnauthorizedService(caller.clone()));
        }
        let mut profile = self
            .profiles
            .get_mut(target)
            .ok_or_else(|| SybilError::NotRegistered(target.clone()))?;
        profile.status = status;
        profile.last_updated = Utc::now();
        Ok(())
    }

    /// Set the flagging threshold. Admin only.
    pub fn set_risk_threshold(
        &self,
        caller: &AccountKey,
        threshold: u8,
    ) -> Result<(), SybilError> {
        if !self.authz.is_admin(caller) {
            return Err(SybilError::NotAdmin(caller.clone()));
        }
        if !in_score_range(threshold) {
            return Err(SybilError::ScoreOutOfRange {
                field: "risk threshold",
                value: threshold,
            });
        }
        self.config.write().expect("sybil config poisoned").risk_threshold = threshold;
        tracing::info!(threshold, "risk threshold updated");
        Ok(())
    }

    /// Toggle whether verification is required. Admin only.
    pub fn set_verification_required(
        &self,
        caller: &AccountKey,
        required: bool,
    ) -> Result<(), SybilError> {
        if !self.authz.is_admin(caller) {
            return Err(SybilError::NotAdmin(caller.clone()));
        }
        self.config
            .write()
            .expect("sybil config poisoned")
            .verification_required = required;
        Ok(())
    }

    /// Replace the set of accepted factor kinds. Admin only.
    pub fn set_enabled_factor_kinds(
        &self,
        caller: &AccountKey,
        kinds: HashSet<FactorKind>,
    ) -> Result<(), SybilError> {
        if !self.authz.is_admin(caller) {
            return Err(SybilError::NotAdmin(caller.clone()));
        }
        self.config
            .write()
            .expect("sybil config poisoned")
            .enabled_factor_kinds = kinds;
        Ok(())
    }

    /// Current risk score.
    pub fn risk_score(&self, account: &AccountKey) -> Result<u8, SybilError> {
        self.profiles
            .get(account)
            .map(|p| p.score)
            .ok_or_else(|| SybilError::NotRegistered(account.clone()))
    }

    /// Score, standing, and last update in one read.
    pub fn risk_details(&self, account: &AccountKey) -> Result<RiskDetails, SybilError> {
        self.profiles
            .get(account)
            .map(|p| RiskDetails {
                score: p.score,
                status: p.status,
                last_updated: p.last_updated,
            })
            .ok_or_else(|| SybilError::NotRegistered(account.clone()))
    }

    /// The audit trail of reported factors, oldest first.
    pub fn risk_factors(&self, account: &AccountKey) -> Result<Vec<RiskFactor>, SybilError> {
        self.profiles
            .get(account)
            .map(|p| p.factors.iter().cloned().collect())
            .ok_or_else(|| SybilError::NotRegistered(account.clone()))
    }

    /// Whether the account's score currently reaches the threshold.
    ///
    /// Recomputed on every call rather than cached, so a threshold change is
    /// reflected immediately.
    pub fn is_flagged(&self, account: &AccountKey) -> Result<bool, SybilError> {
        let score = self.risk_score(account)?;
        Ok(score >= self.risk_threshold())
    }

    /// Coarse risk band for the account's current score.
    pub fn risk_level(&self, account: &AccountKey) -> Result<RiskLevel, SybilError> {
        let score = self.risk_score(account)?;
        let config = self.config.read().expect("sybil config poisoned");
        Ok(RiskLevel::from_score(score, &config.bands))
    }

    /// Whether verification is required before participation.
    pub fn is_verification_required(&self) -> bool {
        self.config
            .read()
            .expect("sybil config poisoned")
            .verification_required
    }

    /// The current flagging threshold.
    pub fn risk_threshold(&self) -> u8 {
        self.config.read().expect("sybil config poisoned").risk_threshold
    }

    /// Whether the account may report risk scores.
    pub fn is_service_authorized(&self, account: &AccountKey) -> bool {
        self.authz.is_service_authorized(account)
    }
}
