use shield_core::{AccountKey, Classify, ErrorClass};

use crate::profile::FactorKind;

/// Risk-registry errors.
#[derive(Debug, thiserror::Error)]
pub enum SybilError {
    #[error("account {0} is not registered for risk scoring")]
    NotRegistered(AccountKey),

    #[error("account {0} is already registered for risk scoring")]
    AlreadyRegistered(AccountKey),

    #[error("caller {0} is not an authorized scoring service")]
    UnauthorizedService(AccountKey),

    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("{field} value {value} is outside 0..=100")]
    ScoreOutOfRange { field: &'static str, value: u8 },

    #[error("factor kind {0} is not enabled")]
    FactorKindDisabled(FactorKind),
}

impl Classify for SybilError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotRegistered(_) => ErrorClass::NotFound,
            Self::AlreadyRegistered(_) => ErrorClass::AlreadyExists,
            Self::UnauthorizedService(_) | Self::NotAdmin(_) => ErrorClass::PermissionDenied,
            Self::ScoreOutOfRange { .. } => ErrorClass::InvalidArgument,
            Self::FactorKindDisabled(_) => ErrorClass::InvalidArgument,
        }
    }
}
