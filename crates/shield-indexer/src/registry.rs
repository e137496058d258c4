use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use shield_authz::{Authorization, RoleKind, RoleRegistry};
use shield_core::events::{
    DataSubmission, IndexerActivation, IndexerRegistered, IndexerSync, TrustEvent,
};
use shield_core::{AccountKey, EventSink};

use crate::config::IndexerConfig;
use crate::error::IndexerError;
use crate::record::{DataKind, IndexerRecord, IndexerType, SubmissionStats};

/// Registry of external data feeders.
///
/// Holds the concrete [`RoleRegistry`] rather than the read-only
/// [`Authorization`] view because registration auto-enrolls qualifying
/// feeders in the authorized set.
pub struct IndexerRegistry {
    records: DashMap<AccountKey, IndexerRecord>,
    stats: DashMap<AccountKey, SubmissionStats>,
    config: RwLock<IndexerConfig>,
    roles: Arc<RoleRegistry>,
    events: Arc<dyn EventSink>,
}

impl IndexerRegistry {
    /// Create a registry with the given configuration.
    pub fn new(
        roles: Arc<RoleRegistry>,
        config: IndexerConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            stats: DashMap::new(),
            config: RwLock::new(config),
            roles,
            events,
        }
    }

    /// Register a feeder.
    ///
    /// The feeder starts active and is auto-enrolled in the authorized set
    /// iff its type is configured for auto-authorization. A zeroed stats
    /// record is created alongside.
    pub fn register(
        &self,
        account: &AccountKey,
        indexer_type: IndexerType,
        name: &str,
        endpoint: &str,
        credential: Vec<u8>,
        data_format_version: u8,
    ) -> Result<(), IndexerError> {
        if name.is_empty() {
            return Err(IndexerError::EmptyField("indexer name"));
        }
        if endpoint.is_empty() {
            return Err(IndexerError::EmptyField("indexer endpoint"));
        }

        let auto_authorized = self
            .config
            .read()
            .expect("indexer config poisoned")
            .auto_authorized_types
            .contains(&indexer_type);

        let now = Utc::now();
        match self.records.entry(account.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(IndexerError::AlreadyRegistered(account.clone()));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(IndexerRecord {
                    indexer_type,
                    name: name.to_string(),
                    endpoint: endpoint.to_string(),
                    credential,
                    is_active: true,
                    last_sync: None,
                    registered_at: now,
                    data_format_version,
                });
            }
        }
        self.stats.insert(account.clone(), SubmissionStats::default());

        if auto_authorized {
            self.roles.grant_direct(account, account, RoleKind::Indexer);
        }

        tracing::info!(
            indexer = %account,
            kind = %indexer_type,
            name,
            auto_authorized,
            "indexer registered"
        );

        self.events.emit(TrustEvent::IndexerRegistered(IndexerRegistered {
            id: TrustEvent::new_id(),
            indexer: account.clone(),
            indexer_type: indexer_type.to_string(),
            name: name.to_string(),
            auto_authorized,
            timestamp: now,
        }));

        Ok(())
    }

    /// Authorize a feeder and mark it active. Admin only.
    ///
    /// Idempotent: an Activation event is emitted only when the active flag
    /// actually flips.
    pub fn authorize(
        &self,
        caller: &AccountKey,
        indexer: &AccountKey,
    ) -> Result<(), IndexerError> {
        if !self.roles.is_admin(caller) {
            return Err(IndexerError::NotAdmin(caller.clone()));
        }

        let changed = {
            let mut record = self
                .records
                .get_mut(indexer)
                .ok_or_else(|| IndexerError::NotRegistered(indexer.clone()))?;
            let changed = !record.is_active;
            record.is_active = true;
            changed
        };
        self.roles.grant_direct(caller, indexer, RoleKind::Indexer);

        if changed {
            tracing::info!(indexer = %indexer, "indexer activated");
            self.events.emit(TrustEvent::IndexerActivated(IndexerActivation {
                id: TrustEvent::new_id(),
                indexer: indexer.clone(),
                changed_by: caller.clone(),
                timestamp: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Deauthorize a feeder and mark it inactive. Admin only.
    ///
    /// Idempotent: a Deactivation event is emitted only when the active flag
    /// actually flips.
    pub fn deauthorize(
        &self,
        caller: &AccountKey,
        indexer: &AccountKey,
    ) -> Result<(), IndexerError> {
        if !self.roles.is_admin(caller) {
            return Err(IndexerError::NotAdmin(caller.clone()));
        }

        let changed = {
            let mut record = self
                .records
                .get_mut(indexer)
                .ok_or_else(|| IndexerError::NotRegistered(indexer.clone()))?;
            let changed = record.is_active;
            record.is_active = false;
            changed
        };
        self.roles.revoke_direct(caller, indexer, RoleKind::Indexer)?;

        if changed {
            tracing::info!(indexer = %indexer, "indexer deactivated");
            self.events.emit(TrustEvent::IndexerDeactivated(IndexerActivation {
                id: TrustEvent::new_id(),
                indexer: indexer.clone(),
                changed_by: caller.clone(),
                timestamp: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Record a data submission from a feeder.
    ///
    /// The feeder must be both authorized and active. The submission always
    /// increments the total and address counters; it counts as successful
    /// only while data processing is globally enabled, and as failed
    /// otherwise.
    pub fn submit_data(
        &self,
        indexer: &AccountKey,
        data_kind: DataKind,
        data_hash: &[u8],
        targets: &[AccountKey],
    ) -> Result<(), IndexerError> {
        self.submit_data_at(indexer, data_kind, data_hash, targets, Utc::now())
    }

    /// [`submit_data`](Self::submit_data) with an explicit timestamp, for
    /// replay and backfill.
    pub fn submit_data_at(
        &self,
        indexer: &AccountKey,
        data_kind: DataKind,
        data_hash: &[u8],
        targets: &[AccountKey],
        now: DateTime<Utc>,
    ) -> Result<(), IndexerError> {
        if !self.roles.is_indexer_authorized(indexer) {
            return Err(IndexerError::Unauthorized(indexer.clone()));
        }

        {
            let record = self
                .records
                .get(indexer)
                .ok_or_else(|| IndexerError::NotRegistered(indexer.clone()))?;
            if !record.is_active {
                return Err(IndexerError::Inactive(indexer.clone()));
            }
        }

        let (max_targets, processed) = {
            let config = self.config.read().expect("indexer config poisoned");
            (config.max_targets_per_submission, config.data_processing_enabled)
        };
        if targets.is_empty() || targets.len() > max_targets {
            return Err(IndexerError::InvalidTargetCount {
                count: targets.len(),
                max: max_targets,
            });
        }

        {
            let mut stats = self
                .stats
                .get_mut(indexer)
                .ok_or_else(|| IndexerError::NotRegistered(indexer.clone()))?;
            stats.submission_count += 1;
            stats.last_submission = Some(now);
            stats.processed_addresses += targets.len() as u64;
            if processed {
                stats.successful_submissions += 1;
            } else {
                stats.failed_submissions += 1;
            }
        }

        tracing::debug!(
            indexer = %indexer,
            kind = %data_kind,
            targets = targets.len(),
            processed,
            "data submitted"
        );

        self.events.emit(TrustEvent::DataSubmission(DataSubmission {
            id: TrustEvent::new_id(),
            indexer: indexer.clone(),
            data_kind: data_kind.to_string(),
            data_hash: hex::encode(data_hash),
            target_count: targets.len(),
            processed,
            timestamp: now,
        }));

        Ok(())
    }

    /// Complete a rate-limited sync, advancing `last_sync` to `now`.
    pub fn sync(&self, indexer: &AccountKey) -> Result<(), IndexerError> {
        self.sync_at(indexer, Utc::now())
    }

    /// [`sync`](Self::sync) with an explicit timestamp, for replay and
    /// backfill.
    pub fn sync_at(&self, indexer: &AccountKey, now: DateTime<Utc>) -> Result<(), IndexerError> {
        let interval_secs = self
            .config
            .read()
            .expect("indexer config poisoned")
            .sync_interval_secs;

        {
            let mut record = self
                .records
                .get_mut(indexer)
                .ok_or_else(|| IndexerError::NotRegistered(indexer.clone()))?;
            if !record.is_active {
                return Err(IndexerError::Inactive(indexer.clone()));
            }
            if let Some(last_sync) = record.last_sync {
                let next_allowed = last_sync + Duration::seconds(interval_secs as i64);
                if now < next_allowed {
                    return Err(IndexerError::IntervalNotReached { next_allowed });
                }
            }
            record.last_sync = Some(now);
        }

        tracing::debug!(indexer = %indexer, "indexer synced");
        self.events.emit(TrustEvent::IndexerSync(IndexerSync {
            id: TrustEvent::new_id(),
            indexer: indexer.clone(),
            timestamp: now,
        }));

        Ok(())
    }

    /// Replace the registry configuration. Admin only.
    pub fn update_config(
        &self,
        caller: &AccountKey,
        config: IndexerConfig,
    ) -> Result<(), IndexerError> {
        if !self.roles.is_admin(caller) {
            return Err(IndexerError::NotAdmin(caller.clone()));
        }
        *self.config.write().expect("indexer config poisoned") = config;
        Ok(())
    }

    /// Registration metadata for a feeder.
    pub fn indexer_info(&self, account: &AccountKey) -> Result<IndexerRecord, IndexerError> {
        self.records
            .get(account)
            .map(|r| r.clone())
            .ok_or_else(|| IndexerError::NotRegistered(account.clone()))
    }

    /// Whether the feeder is active.
    pub fn is_indexer_active(&self, account: &AccountKey) -> Result<bool, IndexerError> {
        self.records
            .get(account)
            .map(|r| r.is_active)
            .ok_or_else(|| IndexerError::NotRegistered(account.clone()))
    }

    /// Submission counters for a feeder.
    pub fn submission_stats(
        &self,
        account: &AccountKey,
    ) -> Result<SubmissionStats, IndexerError> {
        self.stats
            .get(account)
            .map(|s| s.clone())
            .ok_or_else(|| IndexerError::NotRegistered(account.clone()))
    }

    /// Whether the feeder is in the authorized set.
    pub fn is_indexer_authorized(&self, account: &AccountKey) -> bool {
        self.roles.is_indexer_authorized(account)
    }
}
