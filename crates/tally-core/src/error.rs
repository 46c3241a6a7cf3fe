use tally_domain::MoneyError;
use thiserror::Error;
use uuid::Uuid;

pub type CoreResult<T> = Result<T, CoreError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a [`crate::BudgetStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Record {0} belongs to another user")]
    OwnershipConflict(Uuid),
}

/// Errors surfaced by the budgeting services.
///
/// Records that exist but belong to someone else are reported as `NotFound`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Category is required for expenses")]
    CategoryRequired,
    #[error("Budget aggregation failed: {0}")]
    AggregationFailed(#[source] StoreError),
    #[error("Budget totals are out of range: {0}")]
    AmountOverflow(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl CoreError {
    /// Whether the message is actionable for the person who made the request.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            CoreError::AggregationFailed(_)
                | CoreError::AmountOverflow(_)
                | CoreError::Storage(_)
        )
    }
}

impl From<MoneyError> for CoreError {
    fn from(err: MoneyError) -> Self {
        CoreError::InvalidAmount(err.to_string())
    }
}
