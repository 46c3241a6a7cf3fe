//! Monthly assignments of money to categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;
use crate::money::Milliunits;
use crate::month::MonthKey;

/// Money assigned to one category for one month.
///
/// A user has at most one assignment per `(category_id, month)`; writes merge
/// into the existing row for that key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyAssignment {
    pub id: Uuid,
    pub user_id: UserId,
    pub category_id: Uuid,
    pub month: MonthKey,
    pub assigned_amount: Milliunits,
    pub created_at: DateTime<Utc>,
}

impl MonthlyAssignment {
    pub fn new(
        user_id: UserId,
        category_id: Uuid,
        month: MonthKey,
        assigned_amount: Milliunits,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            month,
            assigned_amount,
            created_at: Utc::now(),
        }
    }

    /// Whether this row occupies the uniqueness key `(user, category, month)`.
    pub fn has_key(&self, user: &UserId, category_id: Uuid, month: MonthKey) -> bool {
        &self.user_id == user && self.category_id == category_id && self.month == month
    }
}

impl Identifiable for MonthlyAssignment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl OwnedByUser for MonthlyAssignment {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
