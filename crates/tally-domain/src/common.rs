//! Shared identity types and traits for budgeting records.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an authenticated user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Exposes a stable identifier for stored records.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Records that belong to exactly one user.
pub trait OwnedByUser {
    fn user_id(&self) -> &UserId;

    fn is_owned_by(&self, user: &UserId) -> bool {
        self.user_id() == user
    }
}

/// Provides read-only access to a record's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Records ordered for display by an explicit sort key.
pub trait SortOrdered {
    fn sort_order(&self) -> i32;
}
