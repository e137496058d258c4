use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use shield_core::events::{RoleChange, TrustEvent};
use shield_core::{AccountKey, EventSink};

use crate::error::AuthzError;

/// Capability roles recognised by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    /// May grant/revoke roles and edit component configuration.
    Admin,
    /// May update risk scores and verification status overrides.
    Service,
    /// May decide identity verification requests.
    Verifier,
    /// May update reputation category scores.
    Scorer,
    /// May submit indexed data batches and sync.
    Indexer,
    /// May write feature values.
    Extractor,
    /// May read feature values.
    Reader,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Service => write!(f, "Service"),
            Self::Verifier => write!(f, "Verifier"),
            Self::Scorer => write!(f, "Scorer"),
            Self::Indexer => write!(f, "Indexer"),
            Self::Extractor => write!(f, "Extractor"),
            Self::Reader => write!(f, "Reader"),
        }
    }
}

/// The single allow-list interface consumed by all components.
///
/// Implemented once by [`RoleRegistry`]; components hold it as
/// `Arc<dyn Authorization>` so checks are never duplicated per crate.
pub trait Authorization: Send + Sync {
    /// Whether the account holds the given role.
    fn has_role(&self, account: &AccountKey, role: RoleKind) -> bool;

    /// Whether the account is an admin.
    fn is_admin(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Admin)
    }

    /// Whether the account may update risk scores.
    fn is_service_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Service)
    }

    /// Whether the account may decide verification requests.
    fn is_verifier_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Verifier)
    }

    /// Whether the account may update reputation scores.
    fn is_scorer_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Scorer)
    }

    /// Whether the account may submit indexed data.
    fn is_indexer_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Indexer)
    }

    /// Whether the account may write feature values.
    fn is_extractor_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Extractor)
    }

    /// Whether the account may read feature values.
    fn is_reader_authorized(&self, account: &AccountKey) -> bool {
        self.has_role(account, RoleKind::Reader)
    }
}

/// Admin-controlled role allow-lists.
///
/// Grants and revocations are idempotent set operations; an event is emitted
/// only when membership actually changes. A registry always holds at least
/// one admin: it is constructed with a bootstrap admin and refuses to revoke
/// the last one.
pub struct RoleRegistry {
    members: DashMap<RoleKind, HashSet<AccountKey>>,
    events: Arc<dyn EventSink>,
}

impl RoleRegistry {
    /// Create a registry with a single bootstrap admin.
    pub fn new(bootstrap_admin: AccountKey, events: Arc<dyn EventSink>) -> Self {
        let members = DashMap::new();
        let mut admins = HashSet::new();
        admins.insert(bootstrap_admin);
        members.insert(RoleKind::Admin, admins);
        Self { members, events }
    }

    /// Grant a role to an account. Caller must be an admin.
    ///
    /// Returns `true` if membership changed, `false` for a no-op grant
    /// (which emits no event).
    pub fn grant_role(
        &self,
        caller: &AccountKey,
        account: &AccountKey,
        role: RoleKind,
    ) -> Result<bool, AuthzError> {
        if !self.is_admin(caller) {
            return Err(AuthzError::NotAdmin(caller.clone()));
        }
        Ok(self.grant_direct(caller, account, role))
    }

    /// Revoke a role from an account. Caller must be an admin.
    ///
    /// Revoking the last remaining admin fails, leaving membership unchanged.
    /// Returns `true` if membership changed.
    pub fn revoke_role(
        &self,
        caller: &AccountKey,
        account: &AccountKey,
        role: RoleKind,
    ) -> Result<bool, AuthzError> {
        if !self.is_admin(caller) {
            return Err(AuthzError::NotAdmin(caller.clone()));
        }
        self.revoke_direct(caller, account, role)
    }

    /// Grant a role without an admin check.
    ///
    /// For component-internal automation (feeder auto-enrollment); callers
    /// gate access themselves. Returns `true` if membership changed.
    pub fn grant_direct(
        &self,
        actor: &AccountKey,
        account: &AccountKey,
        role: RoleKind,
    ) -> bool {
        let changed = {
            let mut set = self.members.entry(role).or_default();
            set.insert(account.clone())
        };

        if changed {
            tracing::info!(account = %account, role = %role, by = %actor, "role granted");
            self.events.emit(TrustEvent::RoleGranted(RoleChange {
                id: TrustEvent::new_id(),
                account: account.clone(),
                role: role.to_string(),
                changed_by: actor.clone(),
                timestamp: Utc::now(),
            }));
        }
        changed
    }

    /// Revoke a role without an admin check.
    ///
    /// The at-least-one-admin invariant still holds. Returns `true` if
    /// membership changed.
    pub fn revoke_direct(
        &self,
        actor: &AccountKey,
        account: &AccountKey,
        role: RoleKind,
    ) -> Result<bool, AuthzError> {
        let changed = {
            let mut set = match self.members.get_mut(&role) {
                Some(set) => set,
                None => return Ok(false),
            };
            if role == RoleKind::Admin && set.contains(account) && set.len() == 1 {
                return Err(AuthzError::LastAdmin(account.clone()));
            }
            set.remove(account)
        };

        if changed {
            tracing::info!(account = %account, role = %role, by = %actor, "role revoked");
            self.events.emit(TrustEvent::RoleRevoked(RoleChange {
                id: TrustEvent::new_id(),
                account: account.clone(),
                role: role.to_string(),
                changed_by: actor.clone(),
                timestamp: Utc::now(),
            }));
        }
        Ok(changed)
    }

    /// All members of a role.
    pub fn members(&self, role: RoleKind) -> Vec<AccountKey> {
        self.members
            .get(&role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of members holding a role.
    pub fn member_count(&self, role: RoleKind) -> usize {
        self.members.get(&role).map(|set| set.len()).unwrap_or(0)
    }
}

impl Authorization for RoleRegistry {
    fn has_role(&self, account: &AccountKey, role: RoleKind) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }
}
