use tally_config::ConfigError;
use tally_core::{CoreError, StoreError};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

const GENERIC_FAILURE: &str = "Something went wrong loading your budget. Please try again.";

/// Top-level error for the application facade.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Core(CoreError::Storage(err))
    }
}

impl AppError {
    /// Message safe to show the person who made the request.
    ///
    /// Store and aggregation failures are logged with their cause and replaced
    /// by a generic message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Core(err) if err.is_user_facing() => err.to_string(),
            AppError::Core(err) => {
                tracing::error!(error = %err, cause = ?std::error::Error::source(err), "request failed");
                GENERIC_FAILURE.to_string()
            }
            AppError::Config(err) => {
                tracing::error!(error = %err, "configuration failure");
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_pass_through() {
        let err = AppError::from(CoreError::CategoryRequired);
        assert_eq!(err.user_message(), "Category is required for expenses");

        let err = AppError::from(CoreError::NotFound("Category 42".into()));
        assert_eq!(err.user_message(), "Category 42 not found");
    }

    #[test]
    fn store_failures_are_masked() {
        let err = AppError::from(CoreError::AggregationFailed(StoreError::Unavailable(
            "db down".into(),
        )));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("db down"));

        let err = AppError::from(StoreError::Serde("bad json".into()));
        assert!(!err.user_message().contains("bad json"));
    }
}
