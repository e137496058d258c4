use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use shield_authz::Authorization;
use shield_core::events::{ReputationChange, TrustEvent};
use shield_core::types::in_score_range;
use shield_core::{AccountKey, EventSink};
use shield_identity::IdentityVerificationMachine;

use crate::config::ReputationConfig;
use crate::error::ReputationError;
use crate::record::{Category, CategoryScore, HistoryEntry, ReputationRecord};

/// Read-side view of another component's verification standing.
///
/// The reputation engine and the verification machine are separate atomic
/// stores; a status read and the reputation write it feeds are two calls,
/// and callers tolerate the status changing in between.
pub trait VerificationStatusSource: Send + Sync {
    /// Whether the account counts as verified at `now`.
    fn is_verified_at(&self, account: &AccountKey, now: DateTime<Utc>) -> bool;
}

impl VerificationStatusSource for IdentityVerificationMachine {
    fn is_verified_at(&self, account: &AccountKey, now: DateTime<Utc>) -> bool {
        IdentityVerificationMachine::is_verified_at(self, account, now)
    }
}

/// Per-account reputation engine.
///
/// Every write applies pending decay before mutating, and every read applies
/// the same decay arithmetic as a pure computation, so the two paths never
/// disagree on a score.
pub struct ReputationEngine {
    records: DashMap<AccountKey, ReputationRecord>,
    config: RwLock<ReputationConfig>,
    authz: Arc<dyn Authorization>,
    events: Arc<dyn EventSink>,
}

impl ReputationEngine {
    /// Create an engine with the given configuration.
    pub fn new(
        authz: Arc<dyn Authorization>,
        config: ReputationConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            config: RwLock::new(config),
            authz,
            events,
        }
    }

    /// Register an account, seeding every configured category with its
    /// default score and writing one history entry.
    pub fn register(&self, account: &AccountKey) -> Result<(), ReputationError> {
        self.register_at(account, Utc::now())
    }

    /// [`register`](Self::register) with an explicit timestamp, for replay
    /// and backfill.
    pub fn register_at(
        &self,
        account: &AccountKey,
        now: DateTime<Utc>,
    ) -> Result<(), ReputationError> {
        let (weights, decay_rate) = {
            let config = self.config.read().expect("reputation config poisoned");
            (config.category_weights.clone(), config.default_decay_rate)
        };

        match self.records.entry(account.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ReputationError::AlreadyRegistered(account.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let categories = weights
                    .into_iter()
                    .map(|(category, weight)| {
                        (
                            category,
                            CategoryScore {
                                score: category.default_score(),
                                weight,
                                last_updated: now,
                            },
                        )
                    })
                    .collect();
                let overall = ReputationRecord::weighted_overall(&categories);

                let mut record = ReputationRecord {
                    overall_score: overall,
                    categories,
                    history: Default::default(),
                    decay_rate,
                    last_decay_update: now,
                };
                record.push_history(HistoryEntry {
                    score: overall,
                    timestamp: now,
                    reason: "initial score".into(),
                });
                slot.insert(record);
                tracing::debug!(account = %account, overall, "reputation record registered");
                Ok(())
            }
        }
    }

    /// Update one category score.
    ///
    /// Pending decay is applied first; the category is upserted (inheriting
    /// its configured weight on insert); the overall score is recomputed and,
    /// if it changed, appended to the bounded history.
    pub fn update_category_score(
        &self,
        scorer: &AccountKey,
        target: &AccountKey,
        category: Category,
        new_score: u8,
        reason: &str,
    ) -> Result<(), ReputationError> {
        self.update_category_score_at(scorer, target, category, new_score, reason, Utc::now())
    }

    /// [`update_category_score`](Self::update_category_score) with an
    /// explicit timestamp, for replay and backfill.
    pub fn update_category_score_at(
        &self,
        scorer: &AccountKey,
        target: &AccountKey,
        category: Category,
        new_score: u8,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ReputationError> {
        if !self.authz.is_scorer_authorized(scorer) {
            return Err(ReputationError::UnauthorizedScorer(scorer.clone()));
        }
        if !in_score_range(new_score) {
            return Err(ReputationError::ScoreOutOfRange {
                field: "category score",
                value: new_score,
            });
        }

        let (decay_period_secs, configured_weight) = {
            let config = self.config.read().expect("reputation config poisoned");
            (
                config.decay_period_secs,
                config.category_weights.get(&category).copied().unwrap_or(0),
            )
        };

        let (old_overall, new_overall) = {
            let mut record = self
                .records
                .get_mut(target)
                .ok_or_else(|| ReputationError::NotRegistered(target.clone()))?;

            record.apply_decay(now, decay_period_secs);
            let old_overall = record.overall_score;

            record
                .categories
                .entry(category)
                .and_modify(|entry| {
                    entry.score = new_score;
                    entry.last_updated = now;
                })
                .or_insert_with(|| CategoryScore {
                    score: new_score,
                    weight: configured_weight,
                    last_updated: now,
                });

            let new_overall = ReputationRecord::weighted_overall(&record.categories);
            record.overall_score = new_overall;
            if new_overall != old_overall {
                record.push_history(HistoryEntry {
                    score: new_overall,
                    timestamp: now,
                    reason: reason.to_string(),
                });
            }
            (old_overall, new_overall)
        };

        tracing::debug!(
            target = %target,
            category = %category,
            score = new_score,
            old_overall,
            new_overall,
            "category score updated"
        );

        self.events.emit(TrustEvent::Reputation(ReputationChange {
            id: TrustEvent::new_id(),
            subject: target.clone(),
            category: category.to_string(),
            category_score: new_score,
            old_overall,
            new_overall,
            scorer: scorer.clone(),
            timestamp: now,
        }));

        Ok(())
    }

    /// Sync the VerificationLevel category from the verification machine:
    /// 100 when the account currently holds an approval, 0 otherwise.
    pub fn update_verification_level(
        &self,
        scorer: &AccountKey,
        target: &AccountKey,
        source: &dyn VerificationStatusSource,
    ) -> Result<(), ReputationError> {
        self.update_verification_level_at(scorer, target, source, Utc::now())
    }

    /// [`update_verification_level`](Self::update_verification_level) with
    /// an explicit timestamp, for replay and backfill.
    pub fn update_verification_level_at(
        &self,
        scorer: &AccountKey,
        target: &AccountKey,
        source: &dyn VerificationStatusSource,
        now: DateTime<Utc>,
    ) -> Result<(), ReputationError> {
        let score = if source.is_verified_at(target, now) { 100 } else { 0 };
        self.update_category_score_at(
            scorer,
            target,
            Category::VerificationLevel,
            score,
            "verification status sync",
            now,
        )
    }

    /// Replace the engine configuration. Admin only.
    ///
    /// Applies to future registrations and weight lookups; existing records
    /// keep their per-record decay rate and category weights.
    pub fn update_config(
        &self,
        caller: &AccountKey,
        config: ReputationConfig,
    ) -> Result<(), ReputationError> {
        if !self.authz.is_admin(caller) {
            return Err(ReputationError::NotAdmin(caller.clone()));
        }
        *self.config.write().expect("reputation config poisoned") = config;
        Ok(())
    }

    /// The overall score with pending decay applied as a pure computation.
    pub fn overall_score(&self, account: &AccountKey) -> Result<u8, ReputationError> {
        self.overall_score_at(account, Utc::now())
    }

    /// [`overall_score`](Self::overall_score) at an explicit instant.
    pub fn overall_score_at(
        &self,
        account: &AccountKey,
        now: DateTime<Utc>,
    ) -> Result<u8, ReputationError> {
        let decay_period_secs = self
            .config
            .read()
            .expect("reputation config poisoned")
            .decay_period_secs;
        self.records
            .get(account)
            .map(|r| r.decayed_overall(now, decay_period_secs))
            .ok_or_else(|| ReputationError::NotRegistered(account.clone()))
    }

    /// One category's decayed score; 0 for a category the account does not
    /// track.
    pub fn category_score(
        &self,
        account: &AccountKey,
        category: Category,
    ) -> Result<u8, ReputationError> {
        self.category_score_at(account, category, Utc::now())
    }

    /// [`category_score`](Self::category_score) at an explicit instant.
    pub fn category_score_at(
        &self,
        account: &AccountKey,
        category: Category,
        now: DateTime<Utc>,
    ) -> Result<u8, ReputationError> {
        let decay_period_secs = self
            .config
            .read()
            .expect("reputation config poisoned")
            .decay_period_secs;
        self.records
            .get(account)
            .map(|r| r.decayed_category(category, now, decay_period_secs).unwrap_or(0))
            .ok_or_else(|| ReputationError::NotRegistered(account.clone()))
    }

    /// Whether the decayed overall score reaches `threshold`, or the
    /// configured system minimum when `threshold` is `None`.
    pub fn is_above_threshold(
        &self,
        account: &AccountKey,
        threshold: Option<u8>,
    ) -> Result<bool, ReputationError> {
        self.is_above_threshold_at(account, threshold, Utc::now())
    }

    /// [`is_above_threshold`](Self::is_above_threshold) at an explicit
    /// instant.
    pub fn is_above_threshold_at(
        &self,
        account: &AccountKey,
        threshold: Option<u8>,
        now: DateTime<Utc>,
    ) -> Result<bool, ReputationError> {
        let min = threshold.unwrap_or_else(|| {
            self.config
                .read()
                .expect("reputation config poisoned")
                .min_threshold
        });
        Ok(self.overall_score_at(account, now)? >= min)
    }

    /// The bounded score history, oldest first.
    pub fn history(&self, account: &AccountKey) -> Result<Vec<HistoryEntry>, ReputationError> {
        self.records
            .get(account)
            .map(|r| r.history.iter().cloned().collect())
            .ok_or_else(|| ReputationError::NotRegistered(account.clone()))
    }

    /// The account's per-period decay rate.
    pub fn decay_rate(&self, account: &AccountKey) -> Result<u8, ReputationError> {
        self.records
            .get(account)
            .map(|r| r.decay_rate)
            .ok_or_else(|| ReputationError::NotRegistered(account.clone()))
    }
}
