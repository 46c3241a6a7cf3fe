//! Application facade: wires a store and calendar from configuration and hands
//! out per-request sessions bound to the caller's identity.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tally_core::{
    AssignmentService, BudgetContext, CategoryService, CategoryUpdate, IdentitySource,
    MemoryStore, MonthCalendar, NewCategory, SummaryService, TransactionFilter, TransactionInput,
    TransactionPage, TransactionService,
};
use tally_domain::{
    BudgetSummary, Category, CategoryGroup, CategoryListing, MonthKey, MonthlyAssignment,
    Transaction, TransactionWithCategory, UserId,
};
use tally_storage_json::JsonBudgetStore;

use crate::{
    config::Config,
    errors::AppResult,
    utils::paths,
};

/// Owns the shared service context for the lifetime of the process.
#[derive(Clone)]
pub struct BudgetApp {
    ctx: BudgetContext,
}

impl BudgetApp {
    /// Opens the JSON store in the configured data directory.
    pub fn open(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let dir = paths::store_dir(config);
        let store = JsonBudgetStore::in_dir(&dir)?;
        info!(path = %store.path().display(), "budget store ready");
        Ok(Self::with_context(Self::configure(
            BudgetContext::new(Arc::new(store)),
            config,
        )?))
    }

    /// Non-persistent app, for previews and tests.
    pub fn in_memory(config: &Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self::with_context(Self::configure(
            BudgetContext::new(Arc::new(MemoryStore::new())),
            config,
        )?))
    }

    pub fn with_context(ctx: BudgetContext) -> Self {
        Self { ctx }
    }

    fn configure(ctx: BudgetContext, config: &Config) -> AppResult<BudgetContext> {
        Ok(ctx
            .with_calendar(MonthCalendar::with_offset(config.reference_offset()?))
            .with_page_size(config.transactions_page_size))
    }

    pub fn context(&self) -> &BudgetContext {
        &self.ctx
    }

    /// Resolves the caller once; every call on the session runs as that caller.
    pub fn session(&self, identity: &dyn IdentitySource) -> BudgetSession<'_> {
        BudgetSession {
            ctx: &self.ctx,
            caller: identity.current_user(),
        }
    }
}

/// One request's view of the budget.
pub struct BudgetSession<'a> {
    ctx: &'a BudgetContext,
    caller: Option<UserId>,
}

impl<'a> BudgetSession<'a> {
    pub fn caller(&self) -> Option<&UserId> {
        self.caller.as_ref()
    }

    fn user(&self) -> AppResult<&UserId> {
        Ok(tally_core::require_caller(self.caller())?)
    }

    /// Full figures for `month` (default: current), archived categories included.
    pub fn budget_summary(&self, month: Option<MonthKey>) -> AppResult<BudgetSummary> {
        Ok(SummaryService::compute(self.ctx, self.user()?, month)?)
    }

    /// Budget screen view: archived categories hidden for current and future months.
    pub fn budget_view(&self, month: Option<MonthKey>) -> AppResult<BudgetSummary> {
        Ok(SummaryService::compute_for_display(
            self.ctx,
            self.user()?,
            month,
        )?)
    }

    pub fn categories(&self) -> AppResult<CategoryListing> {
        Ok(CategoryService::list(self.ctx, self.user()?)?)
    }

    pub fn create_category_group(&self, name: &str) -> AppResult<CategoryGroup> {
        Ok(CategoryService::create_group(self.ctx, self.caller(), name)?)
    }

    pub fn create_category(&self, input: NewCategory) -> AppResult<Category> {
        Ok(CategoryService::create(self.ctx, self.caller(), input)?)
    }

    pub fn update_category(&self, changes: CategoryUpdate) -> AppResult<Category> {
        Ok(CategoryService::update(self.ctx, self.caller(), changes)?)
    }

    pub fn archive_category(&self, id: Uuid) -> AppResult<Category> {
        Ok(CategoryService::archive(self.ctx, self.caller(), id)?)
    }

    pub fn unarchive_category(&self, id: Uuid) -> AppResult<Category> {
        Ok(CategoryService::unarchive(self.ctx, self.caller(), id)?)
    }

    pub fn reorder_category(&self, id: Uuid, sort_order: i32) -> AppResult<Category> {
        Ok(CategoryService::reorder(self.ctx, self.caller(), id, sort_order)?)
    }

    pub fn upsert_assignment(&self, category_id: Uuid, amount: &str) -> AppResult<MonthlyAssignment> {
        Ok(AssignmentService::upsert(
            self.ctx,
            self.caller(),
            category_id,
            amount,
        )?)
    }

    pub fn create_transaction(&self, input: TransactionInput) -> AppResult<Transaction> {
        Ok(TransactionService::create(self.ctx, self.caller(), input)?)
    }

    pub fn update_transaction(&self, id: Uuid, input: TransactionInput) -> AppResult<Transaction> {
        Ok(TransactionService::update(self.ctx, self.caller(), id, input)?)
    }

    pub fn delete_transaction(&self, id: Uuid) -> AppResult<()> {
        Ok(TransactionService::delete(self.ctx, self.caller(), id)?)
    }

    pub fn transaction(&self, id: Uuid) -> AppResult<TransactionWithCategory> {
        Ok(TransactionService::get(self.ctx, self.user()?, id)?)
    }

    pub fn transactions(&self, filter: TransactionFilter) -> AppResult<TransactionPage> {
        Ok(TransactionService::list(self.ctx, self.user()?, filter)?)
    }
}
