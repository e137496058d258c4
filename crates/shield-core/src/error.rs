use std::fmt;

/// Coarse classification of component errors.
///
/// Every component crate defines its own `thiserror` enum; this class is the
/// common axis the API layer uses to decide how to surface a failure.
/// `PermissionDenied` and `InvalidState` indicate policy violations operators
/// should see; the rest indicate client input mistakes or missing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorClass {
    /// A required global config record is missing.
    NotInitialized,
    /// Duplicate registration.
    AlreadyExists,
    /// Caller missing from a required allow-list or role.
    PermissionDenied,
    /// Value outside its declared range or enum.
    InvalidArgument,
    /// Operation not valid for the record's current state.
    InvalidState,
    /// Operation on an unregistered account or indexer.
    NotFound,
}

impl ErrorClass {
    /// Whether this class indicates a policy violation rather than a
    /// client input mistake.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::InvalidState)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "NotInitialized"),
            Self::AlreadyExists => write!(f, "AlreadyExists"),
            Self::PermissionDenied => write!(f, "PermissionDenied"),
            Self::InvalidArgument => write!(f, "InvalidArgument"),
            Self::InvalidState => write!(f, "InvalidState"),
            Self::NotFound => write!(f, "NotFound"),
        }
    }
}

/// Maps a component error to its [`ErrorClass`].
pub trait Classify {
    /// The classification of this error.
    fn class(&self) -> ErrorClass;
}
