//! Business logic helpers for category and group management.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use tally_domain::{Category, CategoryGroup, CategoryListing, Milliunits, SortOrdered, UserId};

use crate::{
    context::BudgetContext,
    error::{CoreError, CoreResult},
    identity::require_caller,
};

/// Fields for a new category. `target_amount` is a dollar string; blank means zero.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub group_id: Uuid,
    #[serde(default)]
    pub target_amount: String,
}

/// Replacement name and target for an existing category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub target_amount: String,
}

/// Provides validated operations for [`Category`] and [`CategoryGroup`] records.
///
/// Categories are never deleted; archiving hides them from current views while
/// their history keeps counting.
pub struct CategoryService;

impl CategoryService {
    /// Every group and category the user owns, archived categories included.
    pub fn list(ctx: &BudgetContext, user: &UserId) -> CoreResult<CategoryListing> {
        Ok(CategoryListing {
            groups: ctx.store().category_groups(user)?,
            categories: ctx.store().categories(user)?,
        })
    }

    /// Creates a group at the end of the user's group order.
    pub fn create_group(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        name: &str,
    ) -> CoreResult<CategoryGroup> {
        let user = require_caller(caller)?;
        let name = validate_name(name)?;
        let existing = ctx.store().category_groups(user)?;

        let sort_order = next_sort_order(&existing)?;

        let mut group = CategoryGroup::new(user.clone(), name).with_sort_order(sort_order);
        group.created_at = ctx.now();
        ctx.store().insert_category_group(group.clone())?;
        ctx.invalidate(user);
        info!(user = %user, group_id = %group.id, "category group created");
        Ok(group)
    }

    /// Creates an unarchived category at the end of its group.
    pub fn create(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        input: NewCategory,
    ) -> CoreResult<Category> {
        let user = require_caller(caller)?;
        let name = validate_name(&input.name)?;
        let target = parse_target(&input.target_amount)?;
        if ctx.store().category_group(user, input.group_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Category group {}", input.group_id)));
        }
        let siblings: Vec<Category> = ctx
            .store()
            .categories(user)?
            .into_iter()
            .filter(|category| category.group_id == input.group_id)
            .collect();

        let mut category = Category::new(user.clone(), input.group_id, name)
            .with_target(target)
            .with_sort_order(next_sort_order(&siblings)?);
        category.created_at = ctx.now();
        ctx.store().save_category(category.clone())?;
        ctx.invalidate(user);
        info!(user = %user, category_id = %category.id, "category created");
        Ok(category)
    }

    /// Renames a category and replaces its target.
    pub fn update(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        changes: CategoryUpdate,
    ) -> CoreResult<Category> {
        let user = require_caller(caller)?;
        let name = validate_name(&changes.name)?;
        let target = parse_target(&changes.target_amount)?;
        Self::modify(ctx, user, changes.id, |category| {
            category.name = name;
            category.target_amount = target;
        })
    }

    pub fn archive(ctx: &BudgetContext, caller: Option<&UserId>, id: Uuid) -> CoreResult<Category> {
        let user = require_caller(caller)?;
        Self::modify(ctx, user, id, |category| category.archived = true)
    }

    pub fn unarchive(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        id: Uuid,
    ) -> CoreResult<Category> {
        let user = require_caller(caller)?;
        Self::modify(ctx, user, id, |category| category.archived = false)
    }

    /// Moves a category to an explicit position within its group's ordering.
    pub fn reorder(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        id: Uuid,
        sort_order: i32,
    ) -> CoreResult<Category> {
        let user = require_caller(caller)?;
        Self::modify(ctx, user, id, |category| category.sort_order = sort_order)
    }

    fn modify<F>(ctx: &BudgetContext, user: &UserId, id: Uuid, apply: F) -> CoreResult<Category>
    where
        F: FnOnce(&mut Category),
    {
        let mut category = ctx
            .store()
            .category(user, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Category {id}")))?;
        apply(&mut category);
        ctx.store().save_category(category.clone())?;
        ctx.invalidate(user);
        info!(
            user = %user,
            category_id = %id,
            archived = category.archived,
            "category updated"
        );
        Ok(category)
    }
}

fn validate_name(candidate: &str) -> CoreResult<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("name is required".into()));
    }
    Ok(trimmed.to_string())
}

fn parse_target(raw: &str) -> CoreResult<Milliunits> {
    if raw.trim().is_empty() {
        return Ok(Milliunits::ZERO);
    }
    let target = Milliunits::parse(raw)?;
    if target.is_negative() {
        return Err(CoreError::InvalidAmount("target cannot be negative".into()));
    }
    Ok(target)
}

/// One past the largest sibling position; an empty list starts at 0.
fn next_sort_order<T: SortOrdered>(rows: &[T]) -> CoreResult<i32> {
    match rows.iter().map(SortOrdered::sort_order).max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            CoreError::Validation("no sort position left after the last entry".into())
        }),
    }
}
