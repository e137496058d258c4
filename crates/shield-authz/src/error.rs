use shield_core::{AccountKey, Classify, ErrorClass};

/// Authorization-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("cannot revoke the last admin {0}")]
    LastAdmin(AccountKey),
}

impl Classify for AuthzError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotAdmin(_) => ErrorClass::PermissionDenied,
            Self::LastAdmin(_) => ErrorClass::InvalidState,
        }
    }
}
