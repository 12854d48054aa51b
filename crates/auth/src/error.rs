//! Authentication error types

use thiserror::Error;
use tutor_store::StoreError;

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication operations
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed a format or strength check
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending input field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// OTP cache unreachable or returned an error
    #[error("cache error: {0}")]
    Cache(String),

    // Token validation errors
    /// Token is missing or empty
    #[error("missing token")]
    MissingToken,

    /// Token format is invalid (not tutor_<jwt>)
    #[error("invalid token format")]
    InvalidTokenFormat,

    /// JWT signature verification failed
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Token claims are invalid
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Token could not be signed
    #[error("token signing failed: {0}")]
    TokenSigning(String),

    // Identity errors
    /// Phone number or password did not match
    #[error("invalid phone number or password")]
    InvalidCredentials,

    /// A user with this phone number is already registered
    #[error("phone number already registered")]
    PhoneTaken,

    /// No user with this phone number
    #[error("user not found")]
    UserNotFound,

    /// Password hashing or hash parsing failed
    #[error("password hash error: {0}")]
    Password(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Create a Validation error
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a Cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Whether this error rejects a bearer token
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::InvalidTokenFormat
                | Self::InvalidSignature
                | Self::TokenExpired
                | Self::InvalidClaims(_)
        )
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(e: redis::RedisError) -> Self {
        Self::Cache(e.to_string())
    }
}
