//! The store seam the services read from and write through.
//!
//! Every query is scoped by user. [`StoreTables`] carries the shared filtering,
//! ordering and upsert rules so each backend only decides how the tables are
//! locked and persisted.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_domain::{
    Category, CategoryGroup, Identifiable, Milliunits, MonthKey, MonthlyAssignment, OwnedByUser,
    SortOrdered, Transaction, UserId,
};

use crate::error::{StoreError, StoreResult};

/// Abstraction over persistence backends holding groups, categories,
/// transactions and monthly assignments.
pub trait BudgetStore: Send + Sync {
    /// Groups owned by `user`, ascending by `sort_order`.
    fn category_groups(&self, user: &UserId) -> StoreResult<Vec<CategoryGroup>>;
    /// Categories owned by `user`, archived included, ascending by `sort_order`.
    fn categories(&self, user: &UserId) -> StoreResult<Vec<Category>>;
    /// Matching transactions, newest date first, then newest `created_at`.
    fn transactions(&self, user: &UserId, query: &TransactionQuery)
        -> StoreResult<Vec<Transaction>>;
    /// Number of matching transactions, ignoring `offset` and `limit`.
    fn count_transactions(&self, user: &UserId, query: &TransactionQuery) -> StoreResult<usize>;
    fn transaction(&self, user: &UserId, id: Uuid) -> StoreResult<Option<Transaction>>;
    fn assignments(&self, user: &UserId, months: MonthFilter)
        -> StoreResult<Vec<MonthlyAssignment>>;

    fn insert_category_group(&self, group: CategoryGroup) -> StoreResult<()>;
    /// Inserts the category or replaces the stored row with the same id.
    fn save_category(&self, category: Category) -> StoreResult<()>;
    /// Inserts the transaction or replaces the stored row with the same id.
    fn save_transaction(&self, transaction: Transaction) -> StoreResult<()>;
    /// Returns `false` when no transaction with that id belongs to `user`.
    fn delete_transaction(&self, user: &UserId, id: Uuid) -> StoreResult<bool>;
    /// Atomically merges into the row keyed by `(user, category, month)` or inserts it.
    fn upsert_assignment(&self, upsert: AssignmentUpsert) -> StoreResult<MonthlyAssignment>;

    fn category_group(&self, user: &UserId, id: Uuid) -> StoreResult<Option<CategoryGroup>> {
        Ok(self
            .category_groups(user)?
            .into_iter()
            .find(|group| group.id == id))
    }

    fn category(&self, user: &UserId, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self
            .categories(user)?
            .into_iter()
            .find(|category| category.id == id))
    }
}

/// Equality, range and paging filters over a user's transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring over payee and memo.
    pub search: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn through(to: NaiveDate) -> Self {
        Self {
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.from.map_or(true, |from| transaction.date >= from)
            && self.to.map_or(true, |to| transaction.date <= to)
            && self
                .category_id
                .map_or(true, |id| transaction.category_id == Some(id))
            && self
                .search
                .as_deref()
                .map_or(true, |needle| transaction.matches_search(needle))
    }
}

/// Month selection for assignment reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthFilter {
    Exactly(MonthKey),
    /// Every month up to and including the given one.
    Through(MonthKey),
}

impl MonthFilter {
    pub fn matches(self, month: MonthKey) -> bool {
        match self {
            MonthFilter::Exactly(target) => month == target,
            MonthFilter::Through(target) => month <= target,
        }
    }
}

/// The values written by an assignment upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentUpsert {
    pub user_id: UserId,
    pub category_id: Uuid,
    pub month: MonthKey,
    pub assigned_amount: Milliunits,
    pub at: DateTime<Utc>,
}

/// The four record tables plus the query rules every backend shares.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreTables {
    #[serde(default)]
    pub category_groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub assignments: Vec<MonthlyAssignment>,
}

impl StoreTables {
    pub fn category_groups(&self, user: &UserId) -> Vec<CategoryGroup> {
        sorted_for(&self.category_groups, user)
    }

    pub fn categories(&self, user: &UserId) -> Vec<Category> {
        sorted_for(&self.categories, user)
    }

    pub fn transactions(&self, user: &UserId, query: &TransactionQuery) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.is_owned_by(user) && query.matches(txn))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        let limit = query.limit.unwrap_or(usize::MAX);
        rows.into_iter().skip(query.offset).take(limit).collect()
    }

    pub fn count_transactions(&self, user: &UserId, query: &TransactionQuery) -> usize {
        self.transactions
            .iter()
            .filter(|txn| txn.is_owned_by(user) && query.matches(txn))
            .count()
    }

    pub fn transaction(&self, user: &UserId, id: Uuid) -> Option<Transaction> {
        self.transactions
            .iter()
            .find(|txn| txn.id == id && txn.is_owned_by(user))
            .cloned()
    }

    pub fn assignments(&self, user: &UserId, months: MonthFilter) -> Vec<MonthlyAssignment> {
        self.assignments
            .iter()
            .filter(|row| row.is_owned_by(user) && months.matches(row.month))
            .cloned()
            .collect()
    }

    pub fn insert_category_group(&mut self, group: CategoryGroup) -> StoreResult<()> {
        replace_owned(&mut self.category_groups, group)
    }

    pub fn save_category(&mut self, category: Category) -> StoreResult<()> {
        replace_owned(&mut self.categories, category)
    }

    pub fn save_transaction(&mut self, transaction: Transaction) -> StoreResult<()> {
        replace_owned(&mut self.transactions, transaction)
    }

    pub fn delete_transaction(&mut self, user: &UserId, id: Uuid) -> bool {
        let before = self.transactions.len();
        self.transactions
            .retain(|txn| !(txn.id == id && txn.is_owned_by(user)));
        self.transactions.len() != before
    }

    /// Merge-or-insert keyed on `(user, category, month)`. Callers must hold
    /// exclusive access to the tables for the whole call.
    pub fn upsert_assignment(&mut self, upsert: AssignmentUpsert) -> MonthlyAssignment {
        if let Some(existing) = self
            .assignments
            .iter_mut()
            .find(|row| row.has_key(&upsert.user_id, upsert.category_id, upsert.month))
        {
            existing.assigned_amount = upsert.assigned_amount;
            return existing.clone();
        }
        let mut row = MonthlyAssignment::new(
            upsert.user_id,
            upsert.category_id,
            upsert.month,
            upsert.assigned_amount,
        );
        row.created_at = upsert.at;
        self.assignments.push(row.clone());
        row
    }
}

fn sorted_for<T>(rows: &[T], user: &UserId) -> Vec<T>
where
    T: OwnedByUser + SortOrdered + Clone,
{
    let mut owned: Vec<T> = rows
        .iter()
        .filter(|row| row.is_owned_by(user))
        .cloned()
        .collect();
    owned.sort_by_key(|row| row.sort_order());
    owned
}

fn replace_owned<T>(rows: &mut Vec<T>, row: T) -> StoreResult<()>
where
    T: Identifiable + OwnedByUser,
{
    match rows.iter().position(|existing| existing.id() == row.id()) {
        Some(idx) if !rows[idx].is_owned_by(row.user_id()) => {
            Err(StoreError::OwnershipConflict(row.id()))
        }
        Some(idx) => {
            rows[idx] = row;
            Ok(())
        }
        None => {
            rows.push(row);
            Ok(())
        }
    }
}

/// Process-local store guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<StoreTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: StoreTables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// A copy of every table, for inspection and export.
    pub fn snapshot(&self) -> StoreResult<StoreTables> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreTables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreTables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl BudgetStore for MemoryStore {
    fn category_groups(&self, user: &UserId) -> StoreResult<Vec<CategoryGroup>> {
        Ok(self.read()?.category_groups(user))
    }

    fn categories(&self, user: &UserId) -> StoreResult<Vec<Category>> {
        Ok(self.read()?.categories(user))
    }

    fn transactions(
        &self,
        user: &UserId,
        query: &TransactionQuery,
    ) -> StoreResult<Vec<Transaction>> {
        Ok(self.read()?.transactions(user, query))
    }

    fn count_transactions(&self, user: &UserId, query: &TransactionQuery) -> StoreResult<usize> {
        Ok(self.read()?.count_transactions(user, query))
    }

    fn transaction(&self, user: &UserId, id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.read()?.transaction(user, id))
    }

    fn assignments(
        &self,
        user: &UserId,
        months: MonthFilter,
    ) -> StoreResult<Vec<MonthlyAssignment>> {
        Ok(self.read()?.assignments(user, months))
    }

    fn insert_category_group(&self, group: CategoryGroup) -> StoreResult<()> {
        self.write()?.insert_category_group(group)
    }

    fn save_category(&self, category: Category) -> StoreResult<()> {
        self.write()?.save_category(category)
    }

    fn save_transaction(&self, transaction: Transaction) -> StoreResult<()> {
        self.write()?.save_transaction(transaction)
    }

    fn delete_transaction(&self, user: &UserId, id: Uuid) -> StoreResult<bool> {
        Ok(self.write()?.delete_transaction(user, id))
    }

    fn upsert_assignment(&self, upsert: AssignmentUpsert) -> StoreResult<MonthlyAssignment> {
        Ok(self.write()?.upsert_assignment(upsert))
    }
}
