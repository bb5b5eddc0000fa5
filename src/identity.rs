//! Identity provider boundary.
//!
//! The service never authenticates anyone itself; it asks this collaborator
//! who is calling. `None` means no authenticated identity — mutations then
//! fail with `Unauthorized` while queries degrade to empty results.

use crate::types::UserId;

pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Option<UserId>;
}

/// Fixed identity for local single-user deployments: every call acts as the
/// user named on the command line.
pub struct FixedIdentity {
    user_id: UserId,
}

impl FixedIdentity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        Some(self.user_id.clone())
    }
}

/// No identity at all. Exercises the unauthorized paths.
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_user_id(&self) -> Option<UserId> {
        None
    }
}
