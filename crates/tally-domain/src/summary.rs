//! Output shape of a monthly budget computation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, CategoryGroup};
use crate::money::{Milliunits, MoneyError};
use crate::month::MonthKey;

/// Per-category figures for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBudget {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Milliunits,
    pub sort_order: i32,
    pub archived: bool,
    /// Assigned to the category in this month.
    pub assigned: Milliunits,
    /// Net transaction flow in this month; negative for net spending.
    pub activity: Milliunits,
    /// Everything ever assigned plus everything ever spent, through month end.
    pub available: Milliunits,
}

impl CategoryBudget {
    pub fn from_category(
        category: &Category,
        assigned: Milliunits,
        activity: Milliunits,
        available: Milliunits,
    ) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            target_amount: category.target_amount,
            sort_order: category.sort_order,
            archived: category.archived,
            assigned,
            activity,
            available,
        }
    }

    pub fn is_overspent(&self) -> bool {
        self.available.is_negative()
    }
}

/// A group with its categories and their summed figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupBudget {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub categories: Vec<CategoryBudget>,
    pub total_assigned: Milliunits,
    pub total_activity: Milliunits,
    pub total_available: Milliunits,
}

impl GroupBudget {
    pub fn new(group: &CategoryGroup) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            sort_order: group.sort_order,
            categories: Vec::new(),
            total_assigned: Milliunits::ZERO,
            total_activity: Milliunits::ZERO,
            total_available: Milliunits::ZERO,
        }
    }

    /// Appends a category and folds its figures into the group totals.
    ///
    /// On overflow the group is left unchanged.
    pub fn push(&mut self, category: CategoryBudget) -> Result<(), MoneyError> {
        let assigned = self.total_assigned.checked_add(category.assigned)?;
        let activity = self.total_activity.checked_add(category.activity)?;
        let available = self.total_available.checked_add(category.available)?;
        self.total_assigned = assigned;
        self.total_activity = activity;
        self.total_available = available;
        self.categories.push(category);
        Ok(())
    }

    pub fn has_overspent_category(&self) -> bool {
        self.categories.iter().any(CategoryBudget::is_overspent)
    }
}

/// The complete budget view for one user and month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub month: MonthKey,
    /// This month's income minus this month's assignments. Not cumulative.
    pub money_to_assign: Milliunits,
    pub total_income: Milliunits,
    pub total_assigned: Milliunits,
    /// Uncategorized, non-positive transactions dated in this month. Reported
    /// only; not part of any other figure.
    pub uncategorized_outflow: Milliunits,
    pub groups: Vec<GroupBudget>,
}

impl BudgetSummary {
    pub fn group(&self, id: Uuid) -> Option<&GroupBudget> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&CategoryBudget> {
        self.groups
            .iter()
            .flat_map(|group| group.categories.iter())
            .find(|category| category.id == id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &CategoryBudget> {
        self.groups.iter().flat_map(|group| group.categories.iter())
    }

    /// Drops archived categories and recomputes group totals.
    ///
    /// Month-level figures (`money_to_assign`, `total_income`, `total_assigned`)
    /// are left as computed.
    pub fn active_only(self) -> Result<Self, MoneyError> {
        let groups = self
            .groups
            .into_iter()
            .map(|group| {
                let mut rebuilt = GroupBudget {
                    categories: Vec::new(),
                    total_assigned: Milliunits::ZERO,
                    total_activity: Milliunits::ZERO,
                    total_available: Milliunits::ZERO,
                    ..group
                };
                for category in group.categories.into_iter().filter(|c| !c.archived) {
                    rebuilt.push(category)?;
                }
                Ok(rebuilt)
            })
            .collect::<Result<Vec<_>, MoneyError>>()?;
        Ok(Self { groups, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;

    #[test]
    fn active_only_recomputes_group_totals() {
        let user = UserId::new("u1");
        let group = CategoryGroup::new(user.clone(), "Everyday");
        let live = Category::new(user.clone(), group.id, "Groceries");
        let mut retired = Category::new(user, group.id, "Gym");
        retired.archived = true;

        let mut budget = GroupBudget::new(&group);
        budget.push(CategoryBudget::from_category(
            &live,
            Milliunits::new(100),
            Milliunits::new(-40),
            Milliunits::new(60),
        ))
        .unwrap();
        budget.push(CategoryBudget::from_category(
            &retired,
            Milliunits::ZERO,
            Milliunits::ZERO,
            Milliunits::new(25),
        ))
        .unwrap();
        assert_eq!(budget.total_available, Milliunits::new(85));

        let summary = BudgetSummary {
            month: MonthKey::new(2025, 1).unwrap(),
            money_to_assign: Milliunits::new(900),
            total_income: Milliunits::new(1_000),
            total_assigned: Milliunits::new(100),
            uncategorized_outflow: Milliunits::ZERO,
            groups: vec![budget],
        };
        let active = summary.active_only().unwrap();
        assert_eq!(active.groups[0].categories.len(), 1);
        assert_eq!(active.groups[0].total_available, Milliunits::new(60));
        assert_eq!(active.groups[0].total_activity, Milliunits::new(-40));
        assert_eq!(active.money_to_assign, Milliunits::new(900));
        assert!(active.category(retired.id).is_none());
    }

    #[test]
    fn push_rejects_overflowing_totals_and_keeps_group_intact() {
        let user = UserId::new("u1");
        let group = CategoryGroup::new(user.clone(), "Everyday");
        let first = Category::new(user.clone(), group.id, "Groceries");
        let second = Category::new(user, group.id, "Fuel");
        let huge = Milliunits::new(i64::MAX - 10);

        let mut budget = GroupBudget::new(&group);
        budget
            .push(CategoryBudget::from_category(&first, huge, Milliunits::ZERO, huge))
            .unwrap();
        let err = budget
            .push(CategoryBudget::from_category(
                &second,
                Milliunits::new(11),
                Milliunits::ZERO,
                Milliunits::new(11),
            ))
            .unwrap_err();
        assert_eq!(err, MoneyError::Overflow);
        assert_eq!(budget.categories.len(), 1);
        assert_eq!(budget.total_assigned, huge);
    }
}
