//! tally-domain
//!
//! Pure budgeting records (groups, categories, transactions, assignments), the
//! milliunit money type, month keys and the budget summary shape.
//! No I/O, no storage. Only data types and their invariants.

pub mod assignment;
pub mod category;
pub mod common;
pub mod money;
pub mod month;
pub mod summary;
pub mod transaction;

pub use assignment::*;
pub use category::*;
pub use common::*;
pub use money::*;
pub use month::*;
pub use summary::*;
pub use transaction::*;
