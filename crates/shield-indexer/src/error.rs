use chrono::{DateTime, Utc};

use shield_authz::AuthzError;
use shield_core::{AccountKey, Classify, ErrorClass};

/// Feeder-registry errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("indexer {0} is not registered")]
    NotRegistered(AccountKey),

    #[error("indexer {0} is already registered")]
    AlreadyRegistered(AccountKey),

    #[error("caller {0} is not an authorized indexer")]
    Unauthorized(AccountKey),

    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("indexer {0} is deactivated")]
    Inactive(AccountKey),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("submission carries {count} targets; allowed range is 1..={max}")]
    InvalidTargetCount { count: usize, max: usize },

    #[error("sync interval not reached; next allowed at {next_allowed}")]
    IntervalNotReached { next_allowed: DateTime<Utc> },

    #[error(transparent)]
    Authz(#[from] AuthzError),
}

impl Classify for IndexerError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotRegistered(_) => ErrorClass::NotFound,
            Self::AlreadyRegistered(_) => ErrorClass::AlreadyExists,
            Self::Unauthorized(_) | Self::NotAdmin(_) => ErrorClass::PermissionDenied,
            Self::Inactive(_) | Self::IntervalNotReached { .. } => ErrorClass::InvalidState,
            Self::EmptyField(_) | Self::InvalidTargetCount { .. } => ErrorClass::InvalidArgument,
            Self::Authz(inner) => inner.class(),
        }
    }
}
