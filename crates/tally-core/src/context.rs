//! Collaborators shared by every service call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tally_domain::{MonthKey, UserId};

use crate::{
    calendar::MonthCalendar,
    storage::BudgetStore,
    time::{Clock, SystemClock},
};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Receives a notification after every successful write so cached budget views
/// for that user can be dropped.
pub trait SummaryInvalidator: Send + Sync {
    fn invalidate(&self, user: &UserId);
}

/// Invalidator used when nothing caches summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

impl SummaryInvalidator for NoopInvalidator {
    fn invalidate(&self, _user: &UserId) {}
}

/// Store, clock, calendar and invalidation hook handed to the services.
///
/// Holds no mutable state of its own; cloning shares the collaborators.
#[derive(Clone)]
pub struct BudgetContext {
    store: Arc<dyn BudgetStore>,
    clock: Arc<dyn Clock>,
    calendar: MonthCalendar,
    invalidator: Arc<dyn SummaryInvalidator>,
    page_size: usize,
}

impl BudgetContext {
    pub fn new(store: Arc<dyn BudgetStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            calendar: MonthCalendar::utc(),
            invalidator: Arc::new(NoopInvalidator),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_calendar(mut self, calendar: MonthCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn SummaryInvalidator>) -> Self {
        self.invalidator = invalidator;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn store(&self) -> &dyn BudgetStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn calendar(&self) -> MonthCalendar {
        self.calendar
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn current_month(&self) -> MonthKey {
        self.calendar.current_month(self.clock())
    }

    pub(crate) fn invalidate(&self, user: &UserId) {
        self.invalidator.invalidate(user);
    }
}
