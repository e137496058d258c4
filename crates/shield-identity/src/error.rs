use chrono::{DateTime, Utc};

use shield_core::{AccountKey, Classify, ErrorClass};

/// Identity-verification errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("account {0} is already verified")]
    AlreadyVerified(AccountKey),

    #[error("account {0} has a verification decision pending")]
    PendingDecision(AccountKey),

    #[error("account {account} is in cooldown until {until}")]
    CooldownActive {
        account: AccountKey,
        until: DateTime<Utc>,
    },

    #[error("account {account} exhausted its {attempts} verification attempts")]
    MaxAttemptsExceeded { account: AccountKey, attempts: u32 },

    #[error("account {0} has no verification record")]
    NotRequested(AccountKey),

    #[error("account {0} is not awaiting a verification decision")]
    NotPending(AccountKey),

    #[error("caller {0} is not an authorized verifier")]
    UnauthorizedVerifier(AccountKey),

    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("verification proof must not be empty")]
    EmptyProof,
}

impl Classify for IdentityError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::AlreadyVerified(_)
            | Self::PendingDecision(_)
            | Self::CooldownActive { .. }
            | Self::MaxAttemptsExceeded { .. }
            | Self::NotPending(_) => ErrorClass::InvalidState,
            Self::NotRequested(_) => ErrorClass::NotFound,
            Self::UnauthorizedVerifier(_) | Self::NotAdmin(_) => ErrorClass::PermissionDenied,
            Self::EmptyProof => ErrorClass::InvalidArgument,
        }
    }
}
