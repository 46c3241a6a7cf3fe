#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tally::{config::Config, BudgetApp};
use tally_core::{BudgetContext, FixedClock, StaticIdentity};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).expect("valid date")
}

/// Config pointing the store at a fresh directory that outlives the test.
pub fn temp_config() -> Config {
    let temp = TempDir::new().expect("create temp dir");
    let data_dir = temp.path().join("data");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    Config {
        data_dir: Some(data_dir),
        ..Config::default()
    }
}

/// Re-targets an app's context at a frozen day.
pub fn app_on(app: &BudgetApp, today: NaiveDate) -> BudgetApp {
    let ctx: BudgetContext = app
        .context()
        .clone()
        .with_clock(Arc::new(FixedClock::at_start_of(today)));
    BudgetApp::with_context(ctx)
}

/// JSON-backed app in an isolated directory, frozen at `today`.
pub fn setup_app(today: NaiveDate) -> BudgetApp {
    let app = BudgetApp::open(&temp_config()).expect("open app");
    app_on(&app, today)
}

pub fn alice() -> StaticIdentity {
    StaticIdentity::authenticated("alice")
}
