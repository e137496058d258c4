//! Integration test: identity verification feeding reputation.
//!
//! Covers the verification lifecycle end to end and the one designed
//! cross-component read: the reputation engine pulling verification status
//! into its VerificationLevel category.

use std::sync::Arc;

use chrono::{Duration, Utc};
use shield_authz::{RoleKind, RoleRegistry};
use shield_core::{AccountKey, MemoryEventLog};
use shield_identity::{
    IdentityError, IdentityVerificationMachine, VerificationConfig, VerificationStatus,
    VerificationType,
};
use shield_reputation::{Category, ReputationConfig, ReputationEngine};

struct World {
    machine: IdentityVerificationMachine,
    reputation: ReputationEngine,
    verifier: AccountKey,
    scorer: AccountKey,
}

fn world() -> World {
    let log = Arc::new(MemoryEventLog::new());
    let admin = AccountKey::new("0xadmin");
    let roles = Arc::new(RoleRegistry::new(admin.clone(), log.clone()));
    let verifier = AccountKey::new("0xverifier");
    let scorer = AccountKey::new("0xscorer");
    roles.grant_role(&admin, &verifier, RoleKind::Verifier).unwrap();
    roles.grant_role(&admin, &scorer, RoleKind::Scorer).unwrap();

    let machine = IdentityVerificationMachine::new(
        roles.clone(),
        VerificationConfig::default(),
        log.clone(),
    );
    let reputation =
        ReputationEngine::new(roles.clone(), ReputationConfig::default(), log.clone());

    World {
        machine,
        reputation,
        verifier,
        scorer,
    }
}

// =========================================================================
// Lifecycle: request → approve → expire → renew
// =========================================================================

#[test]
fn test_full_verification_lifecycle() {
    let w = world();
    let alice = AccountKey::new("0xalice");
    let start = Utc::now();

    w.machine
        .request_verification_at(&alice, VerificationType::ProofOfPersonhood, b"captcha".to_vec(), start)
        .unwrap();
    w.machine
        .verify_identity_at(&w.verifier, &alice, true, b"session-proof", start)
        .unwrap();

    assert!(w.machine.is_verified_at(&alice, start));

    // The approval lapses with no write: status reads Expired.
    let past_expiry = start + Duration::seconds(2_592_001);
    assert!(!w.machine.is_verified_at(&alice, past_expiry));
    assert_eq!(
        w.machine.verification_status_at(&alice, past_expiry),
        VerificationStatus::Expired
    );

    // Renewal resets to Pending and a fresh approval restores validity.
    w.machine
        .renew_verification_at(&alice, b"captcha-2".to_vec(), past_expiry)
        .unwrap();
    w.machine
        .verify_identity_at(&w.verifier, &alice, true, b"session-proof-2", past_expiry)
        .unwrap();
    assert!(w.machine.is_verified_at(&alice, past_expiry));
    assert_eq!(w.machine.attempts(&alice).unwrap(), 2);
}

#[test]
fn test_rejection_cooldown_across_calls() {
    let w = world();
    let bob = AccountKey::new("0xbob");
    let start = Utc::now();

    w.machine
        .request_verification_at(&bob, VerificationType::Social, b"challenge".to_vec(), start)
        .unwrap();
    w.machine
        .verify_identity_at(&w.verifier, &bob, false, b"mismatch", start)
        .unwrap();

    let too_soon = start + Duration::hours(1);
    let result = w.machine.request_verification_at(
        &bob,
        VerificationType::Social,
        b"challenge-2".to_vec(),
        too_soon,
    );
    assert!(matches!(result, Err(IdentityError::CooldownActive { .. })));

    let after_cooldown = start + Duration::seconds(86_400);
    w.machine
        .request_verification_at(&bob, VerificationType::Social, b"challenge-2".to_vec(), after_cooldown)
        .unwrap();
    assert_eq!(
        w.machine.verification_status_at(&bob, after_cooldown),
        VerificationStatus::Pending
    );
}

// =========================================================================
// Cross-component read: verification level into reputation
// =========================================================================

#[test]
fn test_verification_level_sync() {
    let w = world();
    let alice = AccountKey::new("0xalice");
    let now = Utc::now();

    w.reputation.register_at(&alice, now).unwrap();
    assert_eq!(
        w.reputation
            .category_score_at(&alice, Category::VerificationLevel, now)
            .unwrap(),
        0
    );
    let unverified_overall = w.reputation.overall_score_at(&alice, now).unwrap();

    // Approve the identity, then sync the category.
    w.machine
        .request_verification_at(&alice, VerificationType::DecentralizedId, b"did".to_vec(), now)
        .unwrap();
    w.machine
        .verify_identity_at(&w.verifier, &alice, true, b"did-proof", now)
        .unwrap();
    w.reputation
        .update_verification_level_at(&w.scorer, &alice, &w.machine, now)
        .unwrap();

    assert_eq!(
        w.reputation
            .category_score_at(&alice, Category::VerificationLevel, now)
            .unwrap(),
        100
    );
    assert!(w.reputation.overall_score_at(&alice, now).unwrap() > unverified_overall);

    // After expiry, a re-sync drops the category back to zero; the
    // verification record itself is untouched.
    let past_expiry = now + Duration::seconds(2_592_001);
    w.reputation
        .update_verification_level_at(&w.scorer, &alice, &w.machine, past_expiry)
        .unwrap();
    assert_eq!(
        w.reputation
            .category_score_at(&alice, Category::VerificationLevel, past_expiry)
            .unwrap(),
        0
    );
    assert_eq!(
        w.machine.verification_status_at(&alice, past_expiry),
        VerificationStatus::Expired
    );
}
