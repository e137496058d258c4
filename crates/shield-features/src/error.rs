use shield_core::{AccountKey, Classify, ErrorClass};

/// Feature-store errors.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("caller {0} is not an authorized extractor")]
    NotExtractor(AccountKey),

    #[error("caller {0} is not an authorized reader")]
    NotReader(AccountKey),

    #[error("caller {0} is not an admin")]
    NotAdmin(AccountKey),

    #[error("feature name must not be empty")]
    EmptyFeatureName,

    #[error("batch arrays disagree: {kinds} kinds, {names} names, {values} values")]
    BatchLengthMismatch {
        kinds: usize,
        names: usize,
        values: usize,
    },

    #[error("batch must contain at least one entry")]
    EmptyBatch,
}

impl Classify for FeatureError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotExtractor(_) | Self::NotReader(_) | Self::NotAdmin(_) => {
                ErrorClass::PermissionDenied
            }
            Self::EmptyFeatureName | Self::BatchLengthMismatch { .. } | Self::EmptyBatch => {
                ErrorClass::InvalidArgument
            }
        }
    }
}
