//! Deterministic, idempotent mutations of an [`IdentityDocument`].
//!
//! Each mutation reports whether it changed the document so callers can
//! skip the write-back when a retried call finds its work already done.

use super::action::Action;
use super::credential::Credential;
use super::document::{Identity, IdentityDocument};

/// What a grant did to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantOutcome {
    pub created_identity: bool,
    pub added_credential: bool,
    pub added_actions: usize,
}

impl GrantOutcome {
    pub fn changed(&self) -> bool {
        self.created_identity || self.added_credential || self.added_actions > 0
    }
}

/// What a bucket-scoped revoke did to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevokeOutcome {
    pub removed_actions: usize,
    pub removed_identity: bool,
}

impl RevokeOutcome {
    pub fn changed(&self) -> bool {
        self.removed_actions > 0 || self.removed_identity
    }
}

impl IdentityDocument {
    /// Ensure `name` exists, holds `credential` (when given) and every one
    /// of `actions`.
    ///
    /// A credential whose key pair is already present is not appended
    /// again. Actions are unioned into the grant list, keeping the order in
    /// which each was first inserted.
    pub fn grant(
        &mut self,
        name: &str,
        credential: Option<Credential>,
        actions: &[Action],
    ) -> GrantOutcome {
        let mut outcome = GrantOutcome::default();

        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.identities.push(Identity::new(name));
                outcome.created_identity = true;
                self.identities.len() - 1
            }
        };
        let identity = &mut self.identities[idx];

        if let Some(credential) = credential.filter(Credential::is_complete) {
            if !identity.has_credential(&credential) {
                identity.credentials.push(credential);
                outcome.added_credential = true;
            }
        }

        for action in actions {
            let action = action.to_string();
            if !identity.has_action(&action) {
                identity.actions.push(action);
                outcome.added_actions += 1;
            }
        }

        outcome
    }

    /// Remove `name` and everything it holds. Revoking an identity that
    /// does not exist is a no-op; returns whether anything was removed.
    pub fn revoke(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.identities.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove the grants `name` holds on `bucket`, leaving its grants on
    /// other buckets and its credentials in place. An identity whose last
    /// grant this removes is dropped; one that held no grant on `bucket` is
    /// left untouched.
    pub fn revoke_bucket(&mut self, name: &str, bucket: &str) -> RevokeOutcome {
        let mut outcome = RevokeOutcome::default();
        let Some(idx) = self.position(name) else {
            return outcome;
        };

        let identity = &mut self.identities[idx];
        let before = identity.actions.len();
        identity
            .actions
            .retain(|action| Action::scope_of(action) != Some(bucket));
        outcome.removed_actions = before - identity.actions.len();

        if outcome.removed_actions > 0 && identity.actions.is_empty() {
            self.identities.remove(idx);
            outcome.removed_identity = true;
        }

        outcome
    }
}
