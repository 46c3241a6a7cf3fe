//! Recording, editing and listing transactions.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use tally_domain::{
    Milliunits, Transaction, TransactionKind, TransactionWithCategory, UserId,
};

use crate::{
    context::BudgetContext,
    error::{CoreError, CoreResult},
    identity::require_caller,
    storage::TransactionQuery,
};

/// User-entered transaction fields. `amount` is a positive dollar string; the
/// stored sign comes from `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// Listing filters; dates are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
    /// Page size; the context default applies when unset.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

/// One page of transactions plus the number of matches across all pages.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionWithCategory>,
    pub total: usize,
}

/// The validated, normalized values a write will store.
struct ValidatedTransaction {
    category_id: Option<Uuid>,
    amount: Milliunits,
    payee: Option<String>,
    memo: Option<String>,
}

pub struct TransactionService;

impl TransactionService {
    pub fn create(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        input: TransactionInput,
    ) -> CoreResult<Transaction> {
        let user = require_caller(caller)?;
        let valid = Self::validate(ctx, user, &input)?;

        let mut transaction = Transaction::new(user.clone(), valid.category_id, input.date, valid.amount);
        transaction.payee = valid.payee;
        transaction.memo = valid.memo;
        transaction.created_at = ctx.now();
        ctx.store().save_transaction(transaction.clone())?;
        ctx.invalidate(user);
        info!(
            user = %user,
            transaction_id = %transaction.id,
            kind = %input.kind,
            amount = transaction.amount.value(),
            "transaction created"
        );
        Ok(transaction)
    }

    /// Replaces every user-editable field, keeping the id and creation time.
    pub fn update(
        ctx: &BudgetContext,
        caller: Option<&UserId>,
        id: Uuid,
        input: TransactionInput,
    ) -> CoreResult<Transaction> {
        let user = require_caller(caller)?;
        let mut transaction = ctx
            .store()
            .transaction(user, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Transaction {id}")))?;
        let valid = Self::validate(ctx, user, &input)?;

        transaction.category_id = valid.category_id;
        transaction.amount = valid.amount;
        transaction.date = input.date;
        transaction.payee = valid.payee;
        transaction.memo = valid.memo;
        ctx.store().save_transaction(transaction.clone())?;
        ctx.invalidate(user);
        info!(user = %user, transaction_id = %id, "transaction updated");
        Ok(transaction)
    }

    /// Permanently removes a transaction.
    pub fn delete(ctx: &BudgetContext, caller: Option<&UserId>, id: Uuid) -> CoreResult<()> {
        let user = require_caller(caller)?;
        if !ctx.store().delete_transaction(user, id)? {
            return Err(CoreError::NotFound(format!("Transaction {id}")));
        }
        ctx.invalidate(user);
        info!(user = %user, transaction_id = %id, "transaction deleted");
        Ok(())
    }

    pub fn get(ctx: &BudgetContext, user: &UserId, id: Uuid) -> CoreResult<TransactionWithCategory> {
        let transaction = ctx
            .store()
            .transaction(user, id)?
            .ok_or_else(|| CoreError::NotFound(format!("Transaction {id}")))?;
        let category_name = match transaction.category_id {
            Some(category_id) => ctx
                .store()
                .category(user, category_id)?
                .map(|category| category.name),
            None => None,
        };
        Ok(TransactionWithCategory {
            transaction,
            category_name,
        })
    }

    /// Filtered, newest-first page of the user's transactions.
    pub fn list(
        ctx: &BudgetContext,
        user: &UserId,
        filter: TransactionFilter,
    ) -> CoreResult<TransactionPage> {
        let query = TransactionQuery {
            from: filter.start_date,
            to: filter.end_date,
            category_id: filter.category_id,
            search: filter
                .search
                .map(|needle| needle.trim().to_string())
                .filter(|needle| !needle.is_empty()),
            offset: filter.offset,
            limit: Some(filter.limit.unwrap_or_else(|| ctx.page_size())),
        };
        let total = ctx.store().count_transactions(user, &query)?;
        let rows = ctx.store().transactions(user, &query)?;
        let names: HashMap<Uuid, String> = ctx
            .store()
            .categories(user)?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();
        debug!(user = %user, total, returned = rows.len(), "transactions listed");

        let transactions = rows
            .into_iter()
            .map(|transaction| {
                let category_name = transaction
                    .category_id
                    .and_then(|id| names.get(&id).cloned());
                TransactionWithCategory {
                    transaction,
                    category_name,
                }
            })
            .collect();
        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    fn validate(
        ctx: &BudgetContext,
        user: &UserId,
        input: &TransactionInput,
    ) -> CoreResult<ValidatedTransaction> {
        let magnitude = Milliunits::parse(&input.amount)?;
        if !magnitude.is_positive() {
            return Err(CoreError::InvalidAmount(
                "amount must be greater than zero".into(),
            ));
        }
        let category_id = match input.kind {
            TransactionKind::Income => None,
            TransactionKind::Expense => {
                let category_id = input.category_id.ok_or(CoreError::CategoryRequired)?;
                if ctx.store().category(user, category_id)?.is_none() {
                    return Err(CoreError::NotFound(format!("Category {category_id}")));
                }
                Some(category_id)
            }
        };
        Ok(ValidatedTransaction {
            category_id,
            amount: input.kind.signed(magnitude),
            payee: normalize_text(input.payee.as_deref()),
            memo: normalize_text(input.memo.as_deref()),
        })
    }
}

fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
