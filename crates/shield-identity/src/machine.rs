use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

use shield_authz::Authorization;
use shield_core::events::{TrustEvent, Verification};
use shield_core::{AccountKey, EventSink};

use crate::config::VerificationConfig;
use crate::error::IdentityError;
use crate::record::{IdentityRecord, VerificationState, VerificationStatus, VerificationType};

/// Per-account identity verification state machine.
///
/// Valid transitions:
/// - (no record) → Pending (request)
/// - Rejected → Pending (request, after cooldown)
/// - Expired → Pending (request or renew)
/// - Pending → Verified | Rejected (verifier decision)
/// - Verified → Pending (renew)
///
/// Each mutating call validates every precondition before touching the
/// record, so a rejected call leaves no trace.
pub struct IdentityVerificationMachine {
    records: DashMap<AccountKey, IdentityRecord>,
    config: RwLock<VerificationConfig>,
    authz: Arc<dyn Authorization>,
    events: Arc<dyn EventSink>,
}

impl IdentityVerificationMachine {
    /// Create a machine with the given configuration.
    pub fn new(
        authz: Arc<dyn Authorization>,
        config: VerificationConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            config: RwLock::new(config),
            authz,
            events,
        }
    }

    /// Request verification for an account.
    ///
    /// Creates a Pending record on first request; afterwards only valid from
    /// Rejected (past its cooldown) or Expired, overwriting the method and
    /// payload and counting another attempt.
    pub fn request_verification(
        &self,
        account: &AccountKey,
        verification_type: VerificationType,
        data: Vec<u8>,
    ) -> Result<(), IdentityError> {
        self.request_verification_at(account, verification_type, data, Utc::now())
    }

    /// [`request_verification`](Self::request_verification) with an explicit
    /// timestamp, for replay and backfill.
    pub fn request_verification_at(
        &self,
        account: &AccountKey,
        verification_type: VerificationType,
        data: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<(), IdentityError> {
        let (max_attempts, cooldown_secs) = {
            let config = self.config.read().expect("verification config poisoned");
            (config.max_attempts, config.cooldown_period_secs)
        };

        match self.records.entry(account.clone()) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(IdentityRecord::new(verification_type, data, now));
                tracing::debug!(account = %account, method = %verification_type, "verification requested");
                Ok(())
            }
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                let record = slot.get_mut();

                match record.state {
                    VerificationState::Verified if !record.is_expired(now) => {
                        return Err(IdentityError::AlreadyVerified(account.clone()));
                    }
                    VerificationState::Pending => {
                        return Err(IdentityError::PendingDecision(account.clone()));
                    }
                    VerificationState::Rejected => {
                        let until =
                            record.last_updated + Duration::seconds(cooldown_secs as i64);
                        if now < until {
                            return Err(IdentityError::CooldownActive {
                                account: account.clone(),
                                until,
                            });
                        }
                    }
                    VerificationState::Verified => {} // expired, may re-request
                }

                if record.attempts >= max_attempts {
                    return Err(IdentityError::MaxAttemptsExceeded {
                        account: account.clone(),
                        attempts: record.attempts,
                    });
                }

                record.verification_type = verification_type;
                record.data = data;
                record.state = VerificationState::Pending;
                record.expires_at = None;
                record.attempts += 1;
                record.requested_at = now;
                record.last_updated = now;
                tracing::debug!(
                    account = %account,
                    method = %verification_type,
                    attempt = record.attempts,
                    "verification re-requested"
                );
                Ok(())
            }
        }
    }

    /// Decide a pending verification request.
    ///
    /// Approval makes the account Verified until `now + validity_period`;
    /// rejection makes it Rejected and starts the cooldown.
    pub fn verify_identity(
        &self,
        verifier: &AccountKey,
        target: &AccountKey,
        approved: bool,
        proof: &[u8],
    ) -> Result<(), IdentityError> {
        self.verify_identity_at(verifier, target, approved, proof, Utc::now())
    }

    /// [`verify_identity`](Self::verify_identity) with an explicit timestamp,
    /// for replay and backfill.
    pub fn verify_identity_at(
        &self,
        verifier: &AccountKey,
        target: &AccountKey,
        approved: bool,
        proof: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), IdentityError> {
        if !self.authz.is_verifier_authorized(verifier) {
            return Err(IdentityError::UnauthorizedVerifier(verifier.clone()));
        }
        if proof.is_empty() {
            return Err(IdentityError::EmptyProof);
        }

        let validity_secs = self
            .config
            .read()
            .expect("verification config poisoned")
            .validity_period_secs;

        let verification_type = {
            let mut record = self
                .records
                .get_mut(target)
                .ok_or_else(|| IdentityError::NotRequested(target.clone()))?;

            if record.state != VerificationState::Pending {
                return Err(IdentityError::NotPending(target.clone()));
            }

            if approved {
                record.state = VerificationState::Verified;
                record.expires_at = Some(now + Duration::seconds(validity_secs as i64));
            } else {
                record.state = VerificationState::Rejected;
                record.expires_at = None;
            }
            record.verifier = Some(verifier.clone());
            record.last_updated = now;
            record.verification_type
        };

        tracing::info!(
            target = %target,
            verifier = %verifier,
            approved,
            "verification decided"
        );

        self.events.emit(TrustEvent::Verification(Verification {
            id: TrustEvent::new_id(),
            subject: target.clone(),
            verifier: verifier.clone(),
            approved,
            verification_type: verification_type.to_string(),
            timestamp: now,
        }));

        Ok(())
    }

    /// Renew a Verified (or expired) account, resetting it to Pending.
    pub fn renew_verification(
        &self,
        account: &AccountKey,
        data: Vec<u8>,
    ) -> Result<(), IdentityError> {
        self.renew_verification_at(account, data, Utc::now())
    }

    /// [`renew_verification`](Self::renew_verification) with an explicit
    /// timestamp, for replay and backfill.
    pub fn renew_verification_at(
        &self,
        account: &AccountKey,
        data: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<(), IdentityError> {
        let max_attempts = self
            .config
            .read()
            .expect("verification config poisoned")
            .max_attempts;

        let mut record = self
            .records
            .get_mut(account)
            .ok_or_else(|| IdentityError::NotRequested(account.clone()))?;

        // Renewal applies to a standing approval, expired or not.
        if record.state != VerificationState::Verified {
            return Err(IdentityError::NotPending(account.clone()));
        }
        if record.attempts >= max_attempts {
            return Err(IdentityError::MaxAttemptsExceeded {
                account: account.clone(),
                attempts: record.attempts,
            });
        }

        record.data = data;
        record.state = VerificationState::Pending;
        record.expires_at = None;
        record.attempts += 1;
        record.requested_at = now;
        record.last_updated = now;

        tracing::debug!(account = %account, attempt = record.attempts, "verification renewal requested");
        Ok(())
    }

    /// Replace the verification configuration. Admin only.
    pub fn update_config(
        &self,
        caller: &AccountKey,
        config: VerificationConfig,
    ) -> Result<(), IdentityError> {
        if !self.authz.is_admin(caller) {
            return Err(IdentityError::NotAdmin(caller.clone()));
        }
        *self.config.write().expect("verification config poisoned") = config;
        Ok(())
    }

    /// Whether the account holds an unexpired approval. Never mutates;
    /// accounts without a record are simply not verified.
    pub fn is_verified(&self, account: &AccountKey) -> bool {
        self.is_verified_at(account, Utc::now())
    }

    /// [`is_verified`](Self::is_verified) at an explicit instant.
    pub fn is_verified_at(&self, account: &AccountKey, now: DateTime<Utc>) -> bool {
        self.records
            .get(account)
            .map(|r| r.is_verified(now))
            .unwrap_or(false)
    }

    /// The account's status, synthesizing Unverified/Expired as needed.
    pub fn verification_status(&self, account: &AccountKey) -> VerificationStatus {
        self.verification_status_at(account, Utc::now())
    }

    /// [`verification_status`](Self::verification_status) at an explicit
    /// instant.
    pub fn verification_status_at(
        &self,
        account: &AccountKey,
        now: DateTime<Utc>,
    ) -> VerificationStatus {
        self.records
            .get(account)
            .map(|r| r.status(now))
            .unwrap_or(VerificationStatus::Unverified)
    }

    /// Attempts used so far.
    pub fn attempts(&self, account: &AccountKey) -> Result<u32, IdentityError> {
        self.records
            .get(account)
            .map(|r| r.attempts)
            .ok_or_else(|| IdentityError::NotRequested(account.clone()))
    }

    /// Snapshot of the full record.
    pub fn record(&self, account: &AccountKey) -> Result<IdentityRecord, IdentityError> {
        self.records
            .get(account)
            .map(|r| r.clone())
            .ok_or_else(|| IdentityError::NotRequested(account.clone()))
    }
}
