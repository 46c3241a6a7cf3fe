#![doc(test(attr(deny(warnings))))]

//! Tally is a personal zero-based budget: money is assigned to categories
//! month by month, spending draws it down, and leftovers or overspending roll
//! into the next month.
//!
//! The domain types live in `tally-domain`, the aggregation engine and
//! validated mutations in `tally-core`. This crate wires them to the JSON store
//! and configuration and exposes [`BudgetApp`].

pub mod app;
pub mod config;
pub mod errors;
pub mod utils;

pub use app::{BudgetApp, BudgetSession};
pub use errors::{AppError, AppResult};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes global tracing with the default filter and logs build metadata.
pub fn init() {
    init_with(None);
}

/// Like [`init`], with an extra filter directive such as `Config::log_filter`.
pub fn init_with(directive: Option<&str>) {
    INIT.call_once(|| {
        utils::init_tracing(directive);
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            status = build.git_status,
            built = build.timestamp,
            profile = build.profile,
            rustc = build.rustc,
            "Tally tracing initialized."
        );
    });
}
