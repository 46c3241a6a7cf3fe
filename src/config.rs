//! Loading the startup configuration from the application home.

pub use tally_config::{Config, ConfigError, ConfigManager};

use crate::{errors::AppResult, utils::paths};

/// Manager for `<app home>/config/config.json`.
pub fn default_manager() -> AppResult<ConfigManager> {
    Ok(ConfigManager::with_base_dir(paths::app_home())?)
}

/// Loads and validates the configuration, or defaults when none is stored.
pub fn load() -> AppResult<Config> {
    let config = default_manager()?.load()?;
    tracing::debug!(
        offset_minutes = config.reference_utc_offset_minutes,
        page_size = config.transactions_page_size,
        "configuration loaded"
    );
    Ok(config)
}
