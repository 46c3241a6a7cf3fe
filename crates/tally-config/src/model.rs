use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

pub const DEFAULT_PAGE_SIZE: usize = 50;
const DATA_DIR_NAME: &str = "tally";
/// Largest offset any real timezone uses, in minutes.
const MAX_OFFSET_MINUTES: u32 = 14 * 60;

/// Settings read once at startup.
///
/// Unknown keys are ignored, so files written by older builds still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Offset from UTC used to decide which month is current. `0` is UTC.
    #[serde(default)]
    pub reference_utc_offset_minutes: i32,
    #[serde(default = "Config::default_page_size")]
    pub transactions_page_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory for the budget store. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_utc_offset_minutes: 0,
            transactions_page_size: Self::default_page_size(),
            data_dir: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_page_size() -> usize {
        DEFAULT_PAGE_SIZE
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DATA_DIR_NAME)
    }

    pub fn reference_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.reference_utc_offset_minutes;
        if minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "reference_utc_offset_minutes {minutes} is outside -840..=840"
            )));
        }
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!("reference_utc_offset_minutes {minutes} is invalid"))
        })
    }

    /// Checks every field that has a constrained range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reference_offset()?;
        if self.transactions_page_size == 0 {
            return Err(ConfigError::Invalid(
                "transactions_page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
