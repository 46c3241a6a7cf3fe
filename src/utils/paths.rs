use std::{env, path::PathBuf};

use crate::config::Config;

pub const HOME_ENV: &str = "TALLY_HOME";
const DEFAULT_DIR_NAME: &str = ".tally";
const DATA_DIR: &str = "data";

/// Application home, `$TALLY_HOME` when set, otherwise `~/.tally`.
pub fn app_home() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the budget store.
///
/// An explicit `data_dir` in the config wins; then `$TALLY_HOME/data`; then the
/// platform data directory.
pub fn store_dir(config: &Config) -> PathBuf {
    if let Some(path) = &config.data_dir {
        return path.clone();
    }
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom).join(DATA_DIR);
    }
    config.resolve_data_dir()
}
