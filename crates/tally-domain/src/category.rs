//! Category groups and the categories budgeted inside them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;
use crate::money::Milliunits;

/// A named, ordered bucket of categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryGroup {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl CategoryGroup {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A spending category that receives monthly assignments.
///
/// Archived categories stay in every aggregation; hiding them is left to the
/// view of the current and future months.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: UserId,
    pub group_id: Uuid,
    pub name: String,
    /// Advisory monthly goal; never enforced.
    pub target_amount: Milliunits,
    pub sort_order: i32,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(user_id: UserId, group_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            group_id,
            name: name.into(),
            target_amount: Milliunits::ZERO,
            sort_order: 0,
            archived: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_target(mut self, target_amount: Milliunits) -> Self {
        self.target_amount = target_amount;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

impl Identifiable for CategoryGroup {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl OwnedByUser for CategoryGroup {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl NamedEntity for CategoryGroup {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SortOrdered for CategoryGroup {
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl OwnedByUser for Category {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SortOrdered for Category {
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

/// Every group and category owned by a user, each sorted by `sort_order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryListing {
    pub groups: Vec<CategoryGroup>,
    pub categories: Vec<Category>,
}

impl CategoryListing {
    pub fn active_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| !category.archived)
    }

    /// Archived categories keyed by group, in group display order. Groups
    /// without archived categories are omitted.
    pub fn archived_by_group(&self) -> Vec<(&CategoryGroup, Vec<&Category>)> {
        let mut by_group: BTreeMap<Uuid, Vec<&Category>> = BTreeMap::new();
        for category in self.categories.iter().filter(|category| category.archived) {
            by_group.entry(category.group_id).or_default().push(category);
        }
        self.groups
            .iter()
            .filter_map(|group| by_group.remove(&group.id).map(|categories| (group, categories)))
            .collect()
    }

    pub fn group(&self, id: Uuid) -> Option<&CategoryGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }
}
