use shield_core::{AccountKey, Classify, ErrorClass};

/// Reputation-engine errors.
#[derive(Debug, thiserror::Error)]
pub enum ReputationError {
    #[error("account {0} is not registered for reputation scoring")]
    NotRegistered(AccountKey),

    #[error("account {0} is already registered for reputation scoring")]
    AlreadyRegistered(AccountKey),

    #[error("caller {0} is not an authorized scorer")]
    UnauthorizedScorer(AccountKey),

    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("{field} value {value} is outside 0..=100")]
    ScoreOutOfRange { field: &'static str, value: u8 },
}

impl Classify for ReputationError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotRegistered(_) => ErrorClass::NotFound,
            Self::AlreadyRegistered(_) => ErrorClass::AlreadyExists,
            Self::UnauthorizedScorer(_) | Self::NotAdmin(_) => ErrorClass::PermissionDenied,
            Self::ScoreOutOfRange { .. } => ErrorClass::InvalidArgument,
        }
    }
}
