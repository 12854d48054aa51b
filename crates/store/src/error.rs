//! Store error types

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Entity already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Invalid data
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// JSON serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an invalid data error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Map an insert failure, turning a UNIQUE violation into `AlreadyExists`
pub(crate) fn insert_conflict(
    err: sqlx::Error,
    entity: &'static str,
    id: impl ToString,
) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::already_exists(entity, id)
    } else {
        StoreError::Database(err)
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_conflict_maps_unique_violation() {
        let store = crate::Store::new_memory().await.unwrap();
        store.catalog().create_grade("Seventh").await.unwrap();
        let err = store.catalog().create_grade("Seventh").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { entity: "grade", .. }));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::not_found("lesson", 7).to_string(),
            "lesson not found: 7"
        );
        assert_eq!(
            StoreError::already_exists("feedback", "u1/3").to_string(),
            "feedback already exists: u1/3"
        );
        assert!(
            StoreError::invalid("rating", "must be between 1 and 5")
                .to_string()
                .contains("rating")
        );
    }
}
