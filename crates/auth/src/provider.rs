//! Token validation
//!
//! Routes resolve the caller through an [`AuthProvider`]; the only
//! implementation checks HS256 tokens signed by the identity service.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use crate::claims::{TokenClaims, strip_token_prefix};
use crate::error::{AuthError, Result};
use crate::user::UserInfo;

/// Resolves a bearer token to the user it was issued for
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Validate a `tutor_` token
    async fn validate(&self, token: &str) -> Result<UserInfo>;

    fn name(&self) -> &'static str;
}

/// HS256 validator sharing its secret with
/// [`IdentityService`](crate::IdentityService)
///
/// ```
/// use tutor_auth::LocalJwtProvider;
///
/// let provider = LocalJwtProvider::new(b"your-secret-key-at-least-32-bytes!");
/// ```
pub struct LocalJwtProvider {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for LocalJwtProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalJwtProvider").finish_non_exhaustive()
    }
}

impl LocalJwtProvider {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        // uid and phone are enforced by deserialization
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl AuthProvider for LocalJwtProvider {
    async fn validate(&self, token: &str) -> Result<UserInfo> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let jwt = strip_token_prefix(token).ok_or(AuthError::InvalidTokenFormat)?;

        let claims = decode::<TokenClaims>(jwt, &self.key, &self.validation)
            .map_err(|e| {
                debug!(error = ?e, "token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    _ => AuthError::InvalidClaims(e.to_string()),
                }
            })?
            .claims;

        Ok(UserInfo::from_claims(&claims))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
