//! Caller identity is resolved once per request and passed explicitly.

use tally_domain::UserId;

use crate::error::{CoreError, CoreResult};

/// Source of the authenticated principal for the current request.
pub trait IdentitySource: Send + Sync {
    /// Returns the caller's user id, or `None` when unauthenticated.
    fn current_user(&self) -> Option<UserId>;
}

/// An identity source that always answers the same way.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    pub fn authenticated(user: impl Into<UserId>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl IdentitySource for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}

/// Rejects calls that carry no identity.
pub fn require_caller(caller: Option<&UserId>) -> CoreResult<&UserId> {
    caller.ok_or(CoreError::NotAuthenticated)
}
