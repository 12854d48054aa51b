//! Authentication extractors for Axum
//!
//! Your app state must implement `HasAuthProvider`:
//!
//! ```ignore
//! use std::sync::Arc;
//! use tutor_auth::{AuthProvider, LocalJwtProvider};
//! use tutor_api::auth::HasAuthProvider;
//!
//! struct AppState {
//!     auth: Arc<dyn AuthProvider>,
//! }
//!
//! impl HasAuthProvider for AppState {
//!     fn auth_provider(&self) -> Arc<dyn AuthProvider> {
//!         Arc::clone(&self.auth)
//!     }
//! }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use tutor_auth::{AuthError as TokenError, AuthProvider, UserInfo};

/// Maximum token size (8KB)
const MAX_TOKEN_SIZE: usize = 8 * 1024;

/// Trait for app state that provides an auth provider
pub trait HasAuthProvider: Send + Sync {
    /// Get the auth provider
    fn auth_provider(&self) -> Arc<dyn AuthProvider>;
}

/// Error returned when authentication fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No token provided
    MissingToken,
    /// Token format or signature is invalid
    InvalidToken,
    /// Token has expired
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::MissingToken => ("AUTH_REQUIRED", "Authentication required"),
            Self::InvalidToken => ("INVALID_TOKEN", "Invalid authentication token"),
            Self::TokenExpired => ("TOKEN_EXPIRED", "Authentication token has expired"),
        };

        let body = serde_json::json!({
            "error": code,
            "message": message,
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Query parameters that may contain a token
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Extract a token from the request
///
/// Checks the Authorization header (Bearer or raw) and then the `token`
/// query parameter. Oversized tokens are treated as missing.
pub fn extract_token(parts: &Parts) -> Option<String> {
    extract_from_auth_header(parts)
        .or_else(|| extract_from_query(parts))
        .filter(|token| token.len() <= MAX_TOKEN_SIZE)
}

fn extract_from_auth_header(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get(AUTHORIZATION)?;

    // "Bearer " = 7 chars
    if auth_header.len() > MAX_TOKEN_SIZE + 7 {
        return None;
    }

    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_from_query(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;

    if query.len() > MAX_TOKEN_SIZE * 2 {
        return None;
    }

    let params: TokenQuery = serde_urlencoded::from_str(query).ok()?;
    params.token.filter(|t| !t.is_empty())
}

/// Authenticated user extractor
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserInfo);

impl std::ops::Deref for AuthUser {
    type Target = UserInfo;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasAuthProvider + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or(AuthError::MissingToken)?;

        let provider = state.auth_provider();
        let user = provider.validate(&token).await.map_err(|e| {
            debug!(provider = provider.name(), error = %e, "token rejected");
            match e {
                TokenError::TokenExpired => AuthError::TokenExpired,
                TokenError::MissingToken => AuthError::MissingToken,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(AuthUser(user))
    }
}
