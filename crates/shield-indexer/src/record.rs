use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a feeder indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexerType {
    /// Transaction streams.
    Transaction,
    /// Account state.
    Account,
    /// Contract events.
    Event,
    /// On-chain resources.
    Resource,
}

impl fmt::Display for IndexerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => write!(f, "Transaction"),
            Self::Account => write!(f, "Account"),
            Self::Event => write!(f, "Event"),
            Self::Resource => write!(f, "Resource"),
        }
    }
}

/// The payload kind of a data submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// A batch of transactions.
    Transactions,
    /// Account state snapshots.
    Accounts,
    /// Contract event records.
    Events,
    /// Resource snapshots.
    Resources,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transactions => write!(f, "Transactions"),
            Self::Accounts => write!(f, "Accounts"),
            Self::Events => write!(f, "Events"),
            Self::Resources => write!(f, "Resources"),
        }
    }
}

/// Registration metadata for one feeder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerRecord {
    /// What the feeder indexes.
    pub indexer_type: IndexerType,
    /// Human-readable name.
    pub name: String,
    /// Endpoint the feeder pulls from.
    pub endpoint: String,
    /// Opaque credential for the endpoint.
    pub credential: Vec<u8>,
    /// Whether the feeder may currently submit.
    pub is_active: bool,
    /// Last successful sync; `None` until the first sync.
    pub last_sync: Option<DateTime<Utc>>,
    /// When the feeder registered.
    pub registered_at: DateTime<Utc>,
    /// Version of the data format the feeder emits.
    pub data_format_version: u8,
}

/// Per-feeder submission counters, paired with the registration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionStats {
    /// Total submissions, accepted or not.
    pub submission_count: u64,
    /// When the last submission was recorded.
    pub last_submission: Option<DateTime<Utc>>,
    /// Total target addresses across all submissions.
    pub processed_addresses: u64,
    /// Submissions counted while data processing was enabled.
    pub successful_submissions: u64,
    /// Submissions recorded while data processing was disabled.
    pub failed_submissions: u64,
}
