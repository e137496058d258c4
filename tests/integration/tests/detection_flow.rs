//! Integration test: end-to-end detection flow across crates.
//!
//! Exercises the authorization registry, feeder registry, feature store, and
//! risk registry together: a feeder registers and submits, an extractor
//! writes features, a scoring service reports a risk score, and the account
//! ends up flagged with exactly the expected event trail.

use std::sync::Arc;

use shield_authz::{Authorization, RoleKind, RoleRegistry};
use shield_core::{AccountKey, MemoryEventLog, TrustEvent};
use shield_features::{FeatureConfig, FeatureKind, FeatureStore};
use shield_indexer::{DataKind, IndexerConfig, IndexerRegistry, IndexerType};
use shield_sybil::{FactorKind, SybilConfig, SybilError, SybilRiskRegistry};

struct World {
    log: Arc<MemoryEventLog>,
    roles: Arc<RoleRegistry>,
    indexers: IndexerRegistry,
    features: FeatureStore,
    risk: SybilRiskRegistry,
    admin: AccountKey,
}

fn world() -> World {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("shield=debug")
        .with_test_writer()
        .try_init();

    let log = Arc::new(MemoryEventLog::new());
    let admin = AccountKey::new("0xadmin");
    let roles = Arc::new(RoleRegistry::new(admin.clone(), log.clone()));

    let indexers = IndexerRegistry::new(roles.clone(), IndexerConfig::default(), log.clone());
    let features = FeatureStore::new(roles.clone(), FeatureConfig::default(), log.clone());
    let risk = SybilRiskRegistry::new(roles.clone(), SybilConfig::default(), log.clone());

    World {
        log,
        roles,
        indexers,
        features,
        risk,
        admin,
    }
}

fn detection_events(log: &MemoryEventLog) -> usize {
    log.snapshot()
        .iter()
        .filter(|e| matches!(e, TrustEvent::Detection(_)))
        .count()
}

// =========================================================================
// Authorization gate then flagging
// =========================================================================

#[test]
fn test_unauthorized_then_authorized_scoring() {
    let w = world();
    let service = AccountKey::new("0xservice");
    let target = AccountKey::new("0xtarget");

    w.risk.register(&target).unwrap();
    w.risk.set_risk_threshold(&w.admin, 70).unwrap();

    // The caller is not yet an authorized service.
    let result = w.risk.update_risk_score(
        &service,
        &target,
        85,
        FactorKind::TransactionPattern,
        85,
        90,
    );
    assert!(matches!(result, Err(SybilError::UnauthorizedService(_))));
    assert_eq!(detection_events(&w.log), 0);

    // The admin authorizes the caller; the same call now succeeds.
    w.roles
        .grant_role(&w.admin, &service, RoleKind::Service)
        .unwrap();
    w.risk
        .update_risk_score(&service, &target, 85, FactorKind::TransactionPattern, 85, 90)
        .unwrap();

    assert!(w.risk.is_flagged(&target).unwrap());
    assert_eq!(w.risk.risk_score(&target).unwrap(), 85);
    assert_eq!(detection_events(&w.log), 1);
}

// =========================================================================
// Full feeder pipeline
// =========================================================================

#[test]
fn test_feeder_pipeline_feeds_detection() {
    let w = world();
    let feeder = AccountKey::new("0xfeeder");
    let extractor = AccountKey::new("0xextractor");
    let service = AccountKey::new("0xservice");
    let reader = AccountKey::new("0xreader");
    let suspect = AccountKey::new("0xsuspect");

    // Transaction feeders auto-enroll in the authorized set.
    w.indexers
        .register(
            &feeder,
            IndexerType::Transaction,
            "devnet-txs",
            "https://indexer.devnet.example/v1/graphql",
            b"api-key".to_vec(),
            1,
        )
        .unwrap();
    assert!(w.roles.is_indexer_authorized(&feeder));

    w.indexers
        .submit_data(&feeder, DataKind::Transactions, b"batch-hash", &[suspect.clone()])
        .unwrap();
    let stats = w.indexers.submission_stats(&feeder).unwrap();
    assert_eq!(stats.submission_count, 1);
    assert_eq!(stats.processed_addresses, 1);

    // The extractor turns raw data into features.
    w.roles
        .grant_role(&w.admin, &extractor, RoleKind::Extractor)
        .unwrap();
    w.roles.grant_role(&w.admin, &reader, RoleKind::Reader).unwrap();
    w.features
        .batch_update_features(
            &extractor,
            &suspect,
            &[FeatureKind::Transaction, FeatureKind::Clustering],
            &["tx_count_sent".to_string(), "degree_centrality".to_string()],
            &[940, 87],
        )
        .unwrap();
    assert_eq!(
        w.features
            .feature_value(&reader, &suspect, FeatureKind::Transaction, "tx_count_sent")
            .unwrap(),
        940
    );

    // The scoring service reports the model output.
    w.roles
        .grant_role(&w.admin, &service, RoleKind::Service)
        .unwrap();
    w.risk.register(&suspect).unwrap();
    w.risk
        .update_risk_score(&service, &suspect, 92, FactorKind::AddressClustering, 95, 88)
        .unwrap();

    assert!(w.risk.is_flagged(&suspect).unwrap());

    // One event of each kind along the pipeline, all about the suspect or
    // the feeder.
    let events = w.log.snapshot();
    assert!(events.iter().any(|e| matches!(e, TrustEvent::IndexerRegistered(_))));
    assert!(events.iter().any(|e| matches!(e, TrustEvent::DataSubmission(_))));
    assert!(events.iter().any(|e| matches!(e, TrustEvent::FeatureBatch(_))));
    assert_eq!(detection_events(&w.log), 1);
}

// =========================================================================
// Deactivation closes the pipeline
// =========================================================================

#[test]
fn test_deactivated_feeder_cannot_submit() {
    let w = world();
    let feeder = AccountKey::new("0xfeeder");
    let target = AccountKey::new("0xtarget");

    w.indexers
        .register(
            &feeder,
            IndexerType::Account,
            "account-feed",
            "https://indexer.example/v1",
            vec![],
            1,
        )
        .unwrap();
    w.indexers
        .submit_data(&feeder, DataKind::Accounts, b"h", &[target.clone()])
        .unwrap();

    w.indexers.deauthorize(&w.admin, &feeder).unwrap();
    let result = w
        .indexers
        .submit_data(&feeder, DataKind::Accounts, b"h", &[target]);
    assert!(result.is_err());

    // Counters did not move on the failed submission.
    assert_eq!(w.indexers.submission_stats(&feeder).unwrap().submission_count, 1);
}
