use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shield_core::AccountKey;

/// Methods by which an identity can be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationType {
    /// Challenge posted through a social platform account.
    Social,
    /// W3C decentralized identifier resolution.
    DecentralizedId,
    /// Proof-of-personhood challenge (liveness, captcha).
    ProofOfPersonhood,
    /// Combination of two or more methods.
    MultiFactor,
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Social => write!(f, "Social"),
            Self::DecentralizedId => write!(f, "DecentralizedId"),
            Self::ProofOfPersonhood => write!(f, "ProofOfPersonhood"),
            Self::MultiFactor => write!(f, "MultiFactor"),
        }
    }
}

/// Stored verification state.
///
/// `Expired` and `Unverified` are deliberately absent: an expired approval is
/// a `Verified` record whose expiry has passed (derived at read time), and an
/// unverified account simply has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    /// Awaiting a verifier decision.
    Pending,
    /// Approved by a verifier.
    Verified,
    /// Rejected by a verifier.
    Rejected,
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Verified => write!(f, "Verified"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Read-side verification status, including the derived states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// No verification record exists.
    Unverified,
    /// Awaiting a verifier decision.
    Pending,
    /// Approved and within its validity window.
    Verified,
    /// Rejected by a verifier.
    Rejected,
    /// Approved, but the validity window has passed.
    Expired,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => write!(f, "Unverified"),
            Self::Pending => write!(f, "Pending"),
            Self::Verified => write!(f, "Verified"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

/// Per-account verification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// The requested verification method.
    pub verification_type: VerificationType,
    /// Stored state.
    pub state: VerificationState,
    /// Opaque verification payload supplied by the requester.
    pub data: Vec<u8>,
    /// End of the validity window; `None` until approved.
    pub expires_at: Option<DateTime<Utc>>,
    /// The verifier that made the last decision.
    pub verifier: Option<AccountKey>,
    /// Total verification attempts, monotonic.
    pub attempts: u32,
    /// When the current request was made.
    pub requested_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub last_updated: DateTime<Utc>,
}

impl IdentityRecord {
    /// Create a fresh Pending record for a first request.
    pub fn new(
        verification_type: VerificationType,
        data: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            verification_type,
            state: VerificationState::Pending,
            data,
            expires_at: None,
            verifier: None,
            attempts: 1,
            requested_at: now,
            last_updated: now,
        }
    }

    /// Whether an approval's validity window has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state == VerificationState::Verified
            && self.expires_at.map(|exp| now > exp).unwrap_or(false)
    }

    /// Whether the record counts as verified at `now`.
    pub fn is_verified(&self, now: DateTime<Utc>) -> bool {
        self.state == VerificationState::Verified && !self.is_expired(now)
    }

    /// The read-side status, synthesizing `Expired` when applicable.
    pub fn status(&self, now: DateTime<Utc>) -> VerificationStatus {
        match self.state {
            VerificationState::Pending => VerificationStatus::Pending,
            VerificationState::Rejected => VerificationStatus::Rejected,
            VerificationState::Verified => {
                if self.is_expired(now) {
                    VerificationStatus::Expired
                } else {
                    VerificationStatus::Verified
                }
            }
        }
    }
}
