//! Analytics error types

use thiserror::Error;
use tutor_store::StoreError;

/// Analytics errors
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Value out of range
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// Storage error (from tutor-store)
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for AnalyticsError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(e))
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
