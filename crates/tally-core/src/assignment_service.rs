//! Assigning money to categories for the current month.

use tracing::info;
use uuid::Uuid;

use tally_domain::{Milliunits, MonthlyAssignment, UserId};

use crate::{
    context::BudgetContext,
    error::{CoreError, CoreResult},
    identity::require_caller,
    storage::AssignmentUpsert,
};

/// Validated writes of monthly assignments.
pub struct AssignmentService;

impl AssignmentService {
    /// Sets the caller's assignment for `category_id` in the current month.
    ///
    /// Repeated calls for the same category and month overwrite the single
    /// stored row; the merge happens inside the store.
    pub fn upsert(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        category_id: Uuid,
        amount: &str,
    ) -> CoreResult<MonthlyAssignment> {
        let user = require_caller(caller)?;
        let assigned_amount = parse_assignment_amount(amount)?;
        if ctx.store().category(user, category_id)?.is_none() {
            return Err(CoreError::NotFound(format!("Category {category_id}")));
        }

        let month = ctx.current_month();
        let row = ctx.store().upsert_assignment(AssignmentUpsert {
            user_id: user.clone(),
            category_id,
            month,
            assigned_amount,
            at: ctx.now(),
        })?;
        ctx.invalidate(user);
        info!(
            user = %user,
            category_id = %category_id,
            month = %month,
            amount = assigned_amount.value(),
            "assignment saved"
        );
        Ok(row)
    }
}

fn parse_assignment_amount(raw: &str) -> CoreResult<Milliunits> {
    let amount = Milliunits::parse(raw)?;
    if amount.is_negative() {
        return Err(CoreError::InvalidAmount(
            "assigned amount cannot be negative".into(),
        ));
    }
    Ok(amount)
}
