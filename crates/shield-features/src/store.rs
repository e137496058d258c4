use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use shield_authz::Authorization;
use shield_core::events::{FeatureBatch, FeatureUpdate, TrustEvent};
use shield_core::{AccountKey, EventSink};

use crate::config::FeatureConfig;
use crate::error::FeatureError;

/// Feature groups produced by the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Transaction-pattern features.
    Transaction,
    /// Address-clustering (graph) features.
    Clustering,
    /// Temporal-pattern features.
    Temporal,
    /// Gas-usage features.
    GasUsage,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => write!(f, "Transaction"),
            Self::Clustering => write!(f, "Clustering"),
            Self::Temporal => write!(f, "Temporal"),
            Self::GasUsage => write!(f, "GasUsage"),
        }
    }
}

/// One stored feature value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEntry {
    /// The feature value.
    pub value: u64,
    /// When the value was written.
    pub timestamp: DateTime<Utc>,
}

/// All features of one account, grouped by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountFeatures {
    /// `kind → name → entry`.
    pub entries: HashMap<FeatureKind, HashMap<String, FeatureEntry>>,
    /// Stamp of the most recent write (a batch counts once).
    pub last_updated: DateTime<Utc>,
}

impl AccountFeatures {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            entries: HashMap::new(),
            last_updated: now,
        }
    }

    fn upsert(&mut self, kind: FeatureKind, name: &str, value: u64, now: DateTime<Utc>) {
        self.entries
            .entry(kind)
            .or_default()
            .insert(name.to_string(), FeatureEntry { value, timestamp: now });
        self.last_updated = now;
    }

    /// Total number of stored entries across kinds.
    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    /// Whether the account has no stored features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Role-gated per-account feature map.
///
/// Extractors write, readers read, admins manage configuration. Reads return
/// zero/absent defaults for missing accounts or keys: the store is a cache
/// of extractor output, and absence is itself data.
pub struct FeatureStore {
    accounts: DashMap<AccountKey, AccountFeatures>,
    config: RwLock<FeatureConfig>,
    authz: Arc<dyn Authorization>,
    events: Arc<dyn EventSink>,
}

impl FeatureStore {
    /// Create a store with the given configuration.
    pub fn new(
        authz: Arc<dyn Authorization>,
        config: FeatureConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            accounts: DashMap::new(),
            config: RwLock::new(config),
            authz,
            events,
        }
    }

    /// Upsert one `(kind, name) → value` entry for the target account.
    pub fn update_feature(
        &self,
        extractor: &AccountKey,
        target: &AccountKey,
        kind: FeatureKind,
        name: &str,
        value: u64,
    ) -> Result<(), FeatureError> {
        self.update_feature_at(extractor, target, kind, name, value, Utc::now())
    }

    /// [`update_feature`](Self::update_feature) with an explicit timestamp,
    /// for replay and backfill.
    pub fn update_feature_at(
        &self,
        extractor: &AccountKey,
        target: &AccountKey,
        kind: FeatureKind,
        name: &str,
        value: u64,
        now: DateTime<Utc>,
    ) -> Result<(), FeatureError> {
        if !self.authz.is_extractor_authorized(extractor) {
            return Err(FeatureError::NotExtractor(extractor.clone()));
        }
        if name.is_empty() {
            return Err(FeatureError::EmptyFeatureName);
        }

        self.accounts
            .entry(target.clone())
            .or_insert_with(|| AccountFeatures::new(now))
            .upsert(kind, name, value, now);

        tracing::debug!(
            target = %target,
            kind = %kind,
            name,
            value,
            "feature updated"
        );

        self.events.emit(TrustEvent::FeatureUpdate(FeatureUpdate {
            id: TrustEvent::new_id(),
            subject: target.clone(),
            feature_kind: kind.to_string(),
            feature_name: name.to_string(),
            value,
            extractor: extractor.clone(),
            timestamp: now,
        }));

        Ok(())
    }

    /// Upsert N entries under one timestamp.
    ///
    /// Emits a single aggregate event carrying only the entry count when
    /// batch aggregation is enabled, or one event per entry otherwise.
    pub fn batch_update_features(
        &self,
        extractor: &AccountKey,
        target: &AccountKey,
        kinds: &[FeatureKind],
        names: &[String],
        values: &[u64],
    ) -> Result<(), FeatureError> {
        self.batch_update_features_at(extractor, target, kinds, names, values, Utc::now())
    }

    /// [`batch_update_features`](Self::batch_update_features) with an
    /// explicit timestamp, for replay and backfill.
    pub fn batch_update_features_at(
        &self,
        extractor: &AccountKey,
        target: &AccountKey,
        kinds: &[FeatureKind],
        names: &[String],
        values: &[u64],
        now: DateTime<Utc>,
    ) -> Result<(), FeatureError> {
        if !self.authz.is_extractor_authorized(extractor) {
            return Err(FeatureError::NotExtractor(extractor.clone()));
        }
        if kinds.len() != names.len() || names.len() != values.len() {
            return Err(FeatureError::BatchLengthMismatch {
                kinds: kinds.len(),
                names: names.len(),
                values: values.len(),
            });
        }
        if kinds.is_empty() {
            return Err(FeatureError::EmptyBatch);
        }
        if names.iter().any(|name| name.is_empty()) {
            return Err(FeatureError::EmptyFeatureName);
        }

        {
            let mut features = self
                .accounts
                .entry(target.clone())
                .or_insert_with(|| AccountFeatures::new(now));
            for ((kind, name), value) in kinds.iter().zip(names).zip(values) {
                features.upsert(*kind, name, *value, now);
            }
        }

        tracing::debug!(target = %target, entries = kinds.len(), "feature batch updated");

        let batch_events_enabled = self
            .config
            .read()
            .expect("feature config poisoned")
            .batch_events_enabled;

        if batch_events_enabled {
            self.events.emit(TrustEvent::FeatureBatch(FeatureBatch {
                id: TrustEvent::new_id(),
                subject: target.clone(),
                entry_count: kinds.len(),
                extractor: extractor.clone(),
                timestamp: now,
            }));
        } else {
            for ((kind, name), value) in kinds.iter().zip(names).zip(values) {
                self.events.emit(TrustEvent::FeatureUpdate(FeatureUpdate {
                    id: TrustEvent::new_id(),
                    subject: target.clone(),
                    feature_kind: kind.to_string(),
                    feature_name: name.clone(),
                    value: *value,
                    extractor: extractor.clone(),
                    timestamp: now,
                }));
            }
        }

        Ok(())
    }

    /// Toggle batch event aggregation. Admin only.
    pub fn set_batch_events_enabled(
        &self,
        caller: &AccountKey,
        enabled: bool,
    ) -> Result<(), FeatureError> {
        if !self.authz.is_admin(caller) {
            return Err(FeatureError::NotAdmin(caller.clone()));
        }
        self.config
            .write()
            .expect("feature config poisoned")
            .batch_events_enabled = enabled;
        Ok(())
    }

    /// A feature value; 0 when the account or key is absent.
    pub fn feature_value(
        &self,
        reader: &AccountKey,
        target: &AccountKey,
        kind: FeatureKind,
        name: &str,
    ) -> Result<u64, FeatureError> {
        Ok(self.feature(reader, target, kind, name)?.map(|e| e.value).unwrap_or(0))
    }

    /// A feature entry with its timestamp, if present.
    pub fn feature(
        &self,
        reader: &AccountKey,
        target: &AccountKey,
        kind: FeatureKind,
        name: &str,
    ) -> Result<Option<FeatureEntry>, FeatureError> {
        if !self.authz.is_reader_authorized(reader) {
            return Err(FeatureError::NotReader(reader.clone()));
        }
        Ok(self
            .accounts
            .get(target)
            .and_then(|f| f.entries.get(&kind).and_then(|m| m.get(name).cloned())))
    }

    /// Snapshot of all features for the account; empty when unknown.
    pub fn account_features(
        &self,
        reader: &AccountKey,
        target: &AccountKey,
    ) -> Result<Option<AccountFeatures>, FeatureError> {
        if !self.authz.is_reader_authorized(reader) {
            return Err(FeatureError::NotReader(reader.clone()));
        }
        Ok(self.accounts.get(target).map(|f| f.clone()))
    }

    /// The account's last write stamp, if any features exist.
    pub fn last_updated(
        &self,
        reader: &AccountKey,
        target: &AccountKey,
    ) -> Result<Option<DateTime<Utc>>, FeatureError> {
        if !self.authz.is_reader_authorized(reader) {
            return Err(FeatureError::NotReader(reader.clone()));
        }
        Ok(self.accounts.get(target).map(|f| f.last_updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;
    use shield_authz::{RoleKind, RoleRegistry};
    use shield_core::MemoryEventLog;

    struct Fixture {
        log: Arc<MemoryEventLog>,
        store: FeatureStore,
        admin: AccountKey,
        extractor: AccountKey,
        reader: AccountKey,
    }

    fn fixture() -> Fixture {
        let log = Arc::new(MemoryEventLog::new());
        let admin = AccountKey::new("0xadmin");
        let roles = Arc::new(RoleRegistry::new(admin.clone(), log.clone()));
        let extractor = AccountKey::new("0xextractor");
        let reader = AccountKey::new("0xreader");
        roles.grant_role(&admin, &extractor, RoleKind::Extractor).unwrap();
        roles.grant_role(&admin, &reader, RoleKind::Reader).unwrap();

        let store = FeatureStore::new(roles, FeatureConfig::default(), log.clone());
        Fixture {
            log,
            store,
            admin,
            extractor,
            reader,
        }
    }

    #[test]
    fn test_update_and_read_feature() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");

        f.store
            .update_feature(
                &f.extractor,
                &target,
                FeatureKind::Transaction,
                names::transaction::TX_COUNT_SENT,
                42,
            )
            .unwrap();

        let value = f
            .store
            .feature_value(
                &f.reader,
                &target,
                FeatureKind::Transaction,
                names::transaction::TX_COUNT_SENT,
            )
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_missing_reads_default_to_zero() {
        let f = fixture();
        let ghost = AccountKey::new("0xghost");

        // Unknown account.
        assert_eq!(
            f.store
                .feature_value(&f.reader, &ghost, FeatureKind::Temporal, "tx_interval_mean")
                .unwrap(),
            0
        );
        assert!(f.store.last_updated(&f.reader, &ghost).unwrap().is_none());
        assert!(f.store.account_features(&f.reader, &ghost).unwrap().is_none());

        // Known account, unknown key.
        let target = AccountKey::new("0xtarget");
        f.store
            .update_feature(&f.extractor, &target, FeatureKind::Transaction, "known", 1)
            .unwrap();
        assert_eq!(
            f.store
                .feature_value(&f.reader, &target, FeatureKind::Transaction, "unknown")
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_write_requires_extractor_role() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");
        let result =
            f.store
                .update_feature(&f.reader, &target, FeatureKind::Transaction, "x", 1);
        assert!(matches!(result, Err(FeatureError::NotExtractor(_))));
    }

    #[test]
    fn test_read_requires_reader_role() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");
        let result =
            f.store
                .feature_value(&f.extractor, &target, FeatureKind::Transaction, "x");
        assert!(matches!(result, Err(FeatureError::NotReader(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");
        let result =
            f.store
                .update_feature(&f.extractor, &target, FeatureKind::Transaction, "", 1);
        assert!(matches!(result, Err(FeatureError::EmptyFeatureName)));
    }

    #[test]
    fn test_upsert_overwrites_in_place() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");

        f.store
            .update_feature(&f.extractor, &target, FeatureKind::GasUsage, "gas_used_mean", 10)
            .unwrap();
        f.store
            .update_feature(&f.extractor, &target, FeatureKind::GasUsage, "gas_used_mean", 20)
            .unwrap();

        assert_eq!(
            f.store
                .feature_value(&f.reader, &target, FeatureKind::GasUsage, "gas_used_mean")
                .unwrap(),
            20
        );
        let features = f.store.account_features(&f.reader, &target).unwrap().unwrap();
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn test_batch_updates_share_one_timestamp_and_event() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");
        let now = Utc::now();
        let events_before = f.log.len();

        f.store
            .batch_update_features_at(
                &f.extractor,
                &target,
                &[FeatureKind::Transaction, FeatureKind::Clustering, FeatureKind::Temporal],
                &[
                    "tx_count_sent".to_string(),
                    "degree_centrality".to_string(),
                    "tx_interval_mean".to_string(),
                ],
                &[7, 3, 120],
                now,
            )
            .unwrap();

        // One aggregate event carrying only the count.
        assert_eq!(f.log.len(), events_before + 1);
        match f.log.last().unwrap() {
            TrustEvent::FeatureBatch(batch) => {
                assert_eq!(batch.entry_count, 3);
                assert_eq!(batch.extractor, f.extractor);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        let features = f.store.account_features(&f.reader, &target).unwrap().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features.last_updated, now);
        for map in features.entries.values() {
            for entry in map.values() {
                assert_eq!(entry.timestamp, now);
            }
        }
    }

    #[test]
    fn test_batch_per_write_events_when_aggregation_disabled() {
        let f = fixture();
        f.store.set_batch_events_enabled(&f.admin, false).unwrap();
        let target = AccountKey::new("0xtarget");
        let events_before = f.log.len();

        f.store
            .batch_update_features(
                &f.extractor,
                &target,
                &[FeatureKind::Transaction, FeatureKind::Transaction],
                &["tx_count_sent".to_string(), "tx_count_received".to_string()],
                &[5, 9],
            )
            .unwrap();

        assert_eq!(f.log.len(), events_before + 2);
        assert!(matches!(f.log.last().unwrap(), TrustEvent::FeatureUpdate(_)));
    }

    #[test]
    fn test_batch_length_mismatch_rejected() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");

        let result = f.store.batch_update_features(
            &f.extractor,
            &target,
            &[FeatureKind::Transaction],
            &["a".to_string(), "b".to_string()],
            &[1],
        );
        assert!(matches!(result, Err(FeatureError::BatchLengthMismatch { .. })));

        // Nothing was written.
        assert!(f.store.account_features(&f.reader, &target).unwrap().is_none());
    }

    #[test]
    fn test_empty_batch_rejected() {
        let f = fixture();
        let target = AccountKey::new("0xtarget");
        let result = f
            .store
            .batch_update_features(&f.extractor, &target, &[], &[], &[]);
        assert!(matches!(result, Err(FeatureError::EmptyBatch)));
    }

    #[test]
    fn test_toggle_requires_admin() {
        let f = fixture();
        let result = f.store.set_batch_events_enabled(&f.reader, false);
        assert!(matches!(result, Err(FeatureError::NotAdmin(_))));
    }
}
