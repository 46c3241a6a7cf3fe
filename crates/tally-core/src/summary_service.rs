//! Monthly budget aggregation with rollover.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};
use uuid::Uuid;

use tally_domain::{
    BudgetSummary, CategoryBudget, GroupBudget, Milliunits, MoneyError, MonthKey,
    TransactionClass, UserId,
};

use crate::{
    context::BudgetContext,
    error::{CoreError, CoreResult},
    storage::{BudgetStore, MonthFilter, TransactionQuery},
};

/// Running figures for one category while the month is being aggregated.
#[derive(Debug, Clone, Copy, Default)]
struct CategoryFigures {
    assigned: Milliunits,
    activity: Milliunits,
    available: Milliunits,
}

/// Derives assigned / activity / available figures for a user and month.
pub struct SummaryService;

impl SummaryService {
    /// Computes the budget summary for `month`, or for the current month when omitted.
    ///
    /// `user` must already be authenticated. Any store failure aborts the whole
    /// computation with [`CoreError::AggregationFailed`]; totals that leave the
    /// `i64` range abort it with [`CoreError::AmountOverflow`].
    pub fn compute(
        ctx: &BudgetContext,
        user: &UserId,
        month: Option<MonthKey>,
    ) -> CoreResult<BudgetSummary> {
        let month = month.unwrap_or_else(|| ctx.current_month());
        Self::aggregate(ctx.store(), user, month).map_err(|err| {
            error!(user = %user, month = %month, error = %err, "budget aggregation failed");
            err
        })
    }

    /// Like [`SummaryService::compute`], but hides archived categories when the
    /// month is the current one or later.
    pub fn compute_for_display(
        ctx: &BudgetContext,
        user: &UserId,
        month: Option<MonthKey>,
    ) -> CoreResult<BudgetSummary> {
        let month = month.unwrap_or_else(|| ctx.current_month());
        let summary = Self::compute(ctx, user, Some(month))?;
        if ctx.calendar().is_current_or_future(ctx.clock(), month) {
            summary.active_only().map_err(overflow)
        } else {
            Ok(summary)
        }
    }

    /// Single read-only pass over the store.
    ///
    /// `available` sums every assignment and every categorized transaction up to
    /// the end of `month`, so leftovers and overspending carry forward without
    /// per-month bookkeeping.
    pub fn aggregate(
        store: &dyn BudgetStore,
        user: &UserId,
        month: MonthKey,
    ) -> CoreResult<BudgetSummary> {
        let (start, end) = month.range();
        let read = CoreError::AggregationFailed;
        let groups = store.category_groups(user).map_err(read)?;
        let categories = store.categories(user).map_err(read)?;
        let month_transactions = store
            .transactions(user, &TransactionQuery::between(start, end))
            .map_err(read)?;
        let cumulative_transactions = store
            .transactions(user, &TransactionQuery::through(end))
            .map_err(read)?;
        let month_assignments = store
            .assignments(user, MonthFilter::Exactly(month))
            .map_err(read)?;
        let cumulative_assignments = store
            .assignments(user, MonthFilter::Through(month))
            .map_err(read)?;

        debug!(
            user = %user,
            month = %month,
            categories = categories.len(),
            transactions = cumulative_transactions.len(),
            assignments = cumulative_assignments.len(),
            "aggregating budget month"
        );

        let mut figures: HashMap<Uuid, CategoryFigures> = HashMap::new();
        let mut total_income = Milliunits::ZERO;
        let mut uncategorized_outflow = Milliunits::ZERO;

        for assignment in &month_assignments {
            let entry = figures.entry(assignment.category_id).or_default();
            entry.assigned = entry
                .assigned
                .checked_add(assignment.assigned_amount)
                .map_err(overflow)?;
        }
        for assignment in &cumulative_assignments {
            let entry = figures.entry(assignment.category_id).or_default();
            entry.available = entry
                .available
                .checked_add(assignment.assigned_amount)
                .map_err(overflow)?;
        }
        for txn in &month_transactions {
            match txn.class() {
                TransactionClass::Categorized(category_id) => {
                    let entry = figures.entry(category_id).or_default();
                    entry.activity = entry.activity.checked_add(txn.amount).map_err(overflow)?;
                }
                TransactionClass::Income => {
                    total_income = total_income.checked_add(txn.amount).map_err(overflow)?;
                }
                TransactionClass::UncategorizedOutflow => {
                    uncategorized_outflow = uncategorized_outflow
                        .checked_add(txn.amount)
                        .map_err(overflow)?;
                }
            }
        }
        for txn in &cumulative_transactions {
            if let Some(category_id) = txn.category_id {
                let entry = figures.entry(category_id).or_default();
                entry.available = entry.available.checked_add(txn.amount).map_err(overflow)?;
            }
        }

        let group_ids: HashSet<Uuid> = groups.iter().map(|group| group.id).collect();
        for orphan in categories
            .iter()
            .filter(|category| !group_ids.contains(&category.group_id))
        {
            warn!(
                user = %user,
                category_id = %orphan.id,
                group_id = %orphan.group_id,
                "category references a missing group and is left out of the summary"
            );
        }

        let groups = groups
            .iter()
            .map(|group| {
                let mut budget = GroupBudget::new(group);
                for category in categories
                    .iter()
                    .filter(|category| category.group_id == group.id)
                {
                    let totals = figures.get(&category.id).copied().unwrap_or_default();
                    budget
                        .push(CategoryBudget::from_category(
                            category,
                            totals.assigned,
                            totals.activity,
                            totals.available,
                        ))
                        .map_err(overflow)?;
                }
                Ok(budget)
            })
            .collect::<CoreResult<Vec<GroupBudget>>>()?;

        let total_assigned =
            Milliunits::checked_sum(groups.iter().map(|group| group.total_assigned))
                .map_err(overflow)?;
        let money_to_assign = total_income
            .checked_sub(total_assigned)
            .map_err(overflow)?;

        Ok(BudgetSummary {
            month,
            money_to_assign,
            total_income,
            total_assigned,
            uncategorized_outflow,
            groups,
        })
    }
}

fn overflow(err: MoneyError) -> CoreError {
    CoreError::AmountOverflow(err.to_string())
}
