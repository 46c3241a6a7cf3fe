//! Resolves "today" and the current budget month in the reference timezone.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tally_domain::MonthKey;

use crate::time::Clock;

/// Maps instants onto calendar months using one fixed UTC offset.
///
/// The offset is chosen once at startup; it decides which month is "current"
/// and therefore the default budget view and the month new assignments land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCalendar {
    offset: FixedOffset,
}

impl MonthCalendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        clock.now().with_timezone(&self.offset).date_naive()
    }

    pub fn current_month(&self, clock: &dyn Clock) -> MonthKey {
        MonthKey::containing(self.today(clock))
    }

    /// True for the current month and every month after it.
    pub fn is_current_or_future(&self, clock: &dyn Clock, month: MonthKey) -> bool {
        month >= self.current_month(clock)
    }
}

impl Default for MonthCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
