//! Structured trust events.
//!
//! Every successful state change in the system emits exactly one event; a
//! failed precondition emits none. The event log is the sole mechanism by
//! which webhook/dashboard collaborators observe state changes; they never
//! poll internal storage.
//!
//! Payloads carry enum names as strings so this crate stays free of
//! component-crate dependencies; the emitting component renders its own
//! enums via `Display`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

use crate::types::AccountKey;

/// Events emitted by the trust-state layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrustEvent {
    /// A role was granted to an account.
    RoleGranted(RoleChange),

    /// A role was revoked from an account.
    RoleRevoked(RoleChange),

    /// A risk score was updated for an account.
    Detection(Detection),

    /// An identity verification decision or request was recorded.
    Verification(Verification),

    /// A reputation category score changed.
    Reputation(ReputationChange),

    /// An external data feeder registered.
    IndexerRegistered(IndexerRegistered),

    /// A feeder was activated by an admin.
    IndexerActivated(IndexerActivation),

    /// A feeder was deactivated by an admin.
    IndexerDeactivated(IndexerActivation),

    /// A feeder submitted a data batch.
    DataSubmission(DataSubmission),

    /// A feeder completed a sync.
    IndexerSync(IndexerSync),

    /// A single feature value was written.
    FeatureUpdate(FeatureUpdate),

    /// A batch of feature values was written under one aggregate event.
    FeatureBatch(FeatureBatch),
}

/// Emitted when role membership actually changes (no-op grants are silent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    /// Event id.
    pub id: Uuid,
    /// The account whose membership changed.
    pub account: AccountKey,
    /// Name of the role.
    pub role: String,
    /// The admin who made the change.
    pub changed_by: AccountKey,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

/// Emitted on every successful risk-score update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Event id.
    pub id: Uuid,
    /// The account whose risk score changed.
    pub subject: AccountKey,
    /// The new risk score.
    pub score: u8,
    /// Whether the score crossed the flagging threshold.
    pub flagged: bool,
    /// The service that reported the score.
    pub reported_by: AccountKey,
    /// When the update was applied.
    pub timestamp: DateTime<Utc>,
}

/// Emitted when an identity verification decision is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    /// Event id.
    pub id: Uuid,
    /// The account being verified.
    pub subject: AccountKey,
    /// The verifier that made the decision.
    pub verifier: AccountKey,
    /// Whether the verification was approved.
    pub approved: bool,
    /// Name of the verification type.
    pub verification_type: String,
    /// When the decision was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a reputation update changes stored state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationChange {
    /// Event id.
    pub id: Uuid,
    /// The account whose reputation changed.
    pub subject: AccountKey,
    /// Name of the category that was updated.
    pub category: String,
    /// The new category score.
    pub category_score: u8,
    /// Overall score before the update (after decay).
    pub old_overall: u8,
    /// Overall score after the update.
    pub new_overall: u8,
    /// The scorer that applied the update.
    pub scorer: AccountKey,
    /// When the update was applied.
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a feeder registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerRegistered {
    /// Event id.
    pub id: Uuid,
    /// The feeder account.
    pub indexer: AccountKey,
    /// Name of the feeder type.
    pub indexer_type: String,
    /// Human-readable feeder name.
    pub name: String,
    /// Whether registration auto-enrolled the feeder in the authorized set.
    pub auto_authorized: bool,
    /// When registration completed.
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a feeder's active flag actually flips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerActivation {
    /// Event id.
    pub id: Uuid,
    /// The feeder account.
    pub indexer: AccountKey,
    /// The admin who flipped the flag.
    pub changed_by: AccountKey,
    /// When the flag changed.
    pub timestamp: DateTime<Utc>,
}

/// Emitted on every accepted data submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSubmission {
    /// Event id.
    pub id: Uuid,
    /// The submitting feeder.
    pub indexer: AccountKey,
    /// Name of the submitted data kind.
    pub data_kind: String,
    /// Hex-encoded hash of the submitted payload.
    pub data_hash: String,
    /// Number of target accounts in the batch.
    pub target_count: usize,
    /// Whether the batch was counted as processed (data processing enabled).
    pub processed: bool,
    /// When the submission was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Emitted on a successful rate-limited sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSync {
    /// Event id.
    pub id: Uuid,
    /// The syncing feeder.
    pub indexer: AccountKey,
    /// The new `last_sync` value.
    pub timestamp: DateTime<Utc>,
}

/// Emitted per feature write when batch aggregation is disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureUpdate {
    /// Event id.
    pub id: Uuid,
    /// The account whose feature map changed.
    pub subject: AccountKey,
    /// Name of the feature kind.
    pub feature_kind: String,
    /// Feature name within the kind.
    pub feature_name: String,
    /// The new value.
    pub value: u64,
    /// The extractor that wrote the value.
    pub extractor: AccountKey,
    /// When the write was applied.
    pub timestamp: DateTime<Utc>,
}

/// Single aggregate event for a batch write, bounding event volume under
/// high-frequency extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBatch {
    /// Event id.
    pub id: Uuid,
    /// The account whose feature map changed.
    pub subject: AccountKey,
    /// Number of entries written in the batch.
    pub entry_count: usize,
    /// The extractor that wrote the batch.
    pub extractor: AccountKey,
    /// When the batch was applied.
    pub timestamp: DateTime<Utc>,
}

impl TrustEvent {
    /// The account this event is about.
    pub fn subject(&self) -> &AccountKey {
        match self {
            Self::RoleGranted(e) | Self::RoleRevoked(e) => &e.account,
            Self::Detection(e) => &e.subject,
            Self::Verification(e) => &e.subject,
            Self::Reputation(e) => &e.subject,
            Self::IndexerRegistered(e) => &e.indexer,
            Self::IndexerActivated(e) | Self::IndexerDeactivated(e) => &e.indexer,
            Self::DataSubmission(e) => &e.indexer,
            Self::IndexerSync(e) => &e.indexer,
            Self::FeatureUpdate(e) => &e.subject,
            Self::FeatureBatch(e) => &e.subject,
        }
    }

    /// The event id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::RoleGranted(e) | Self::RoleRevoked(e) => e.id,
            Self::Detection(e) => e.id,
            Self::Verification(e) => e.id,
            Self::Reputation(e) => e.id,
            Self::IndexerRegistered(e) => e.id,
            Self::IndexerActivated(e) | Self::IndexerDeactivated(e) => e.id,
            Self::DataSubmission(e) => e.id,
            Self::IndexerSync(e) => e.id,
            Self::FeatureUpdate(e) => e.id,
            Self::FeatureBatch(e) => e.id,
        }
    }

    /// When the event was recorded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RoleGranted(e) | Self::RoleRevoked(e) => e.timestamp,
            Self::Detection(e) => e.timestamp,
            Self::Verification(e) => e.timestamp,
            Self::Reputation(e) => e.timestamp,
            Self::IndexerRegistered(e) => e.timestamp,
            Self::IndexerActivated(e) | Self::IndexerDeactivated(e) => e.timestamp,
            Self::DataSubmission(e) => e.timestamp,
            Self::IndexerSync(e) => e.timestamp,
            Self::FeatureUpdate(e) => e.timestamp,
            Self::FeatureBatch(e) => e.timestamp,
        }
    }

    /// Allocate a fresh event id.
    pub fn new_id() -> Uuid {
        Uuid::now_v7()
    }
}

/// Sink for trust events.
///
/// Components emit only after a mutation has been applied; a failed
/// precondition must never reach the sink.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: TrustEvent);
}

/// Append-only in-memory event log.
pub struct MemoryEventLog {
    events: RwLock<Vec<TrustEvent>>,
}

impl MemoryEventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().expect("event log poisoned").len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all events in emission order.
    pub fn snapshot(&self) -> Vec<TrustEvent> {
        self.events.read().expect("event log poisoned").clone()
    }

    /// All events about the given account, in emission order.
    pub fn events_for(&self, account: &AccountKey) -> Vec<TrustEvent> {
        self.events
            .read()
            .expect("event log poisoned")
            .iter()
            .filter(|e| e.subject() == account)
            .cloned()
            .collect()
    }

    /// The most recently emitted event, if any.
    pub fn last(&self) -> Option<TrustEvent> {
        self.events.read().expect("event log poisoned").last().cloned()
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemoryEventLog {
    fn emit(&self, event: TrustEvent) {
        tracing::debug!(
            event_id = %event.id(),
            subject = %event.subject(),
            "trust event recorded"
        );
        self.events.write().expect("event log poisoned").push(event);
    }
}
