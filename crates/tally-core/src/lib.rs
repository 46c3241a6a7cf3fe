//! tally-core
//!
//! Budget aggregation and validated mutations over a pluggable store.
//! Depends on tally-domain. No terminal I/O, no direct file access.

pub mod assignment_service;
pub mod calendar;
pub mod category_service;
pub mod context;
pub mod error;
pub mod identity;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;

pub use assignment_service::*;
pub use calendar::MonthCalendar;
pub use category_service::*;
pub use context::{BudgetContext, NoopInvalidator, SummaryInvalidator};
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use identity::{require_caller, IdentitySource, StaticIdentity};
pub use storage::{BudgetStore, MemoryStore};
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction_service::*;
