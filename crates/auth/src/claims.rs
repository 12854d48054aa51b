//! Bearer token claims
//!
//! A bearer token is `tutor_` followed by an HS256 JWT carrying
//! [`TokenClaims`].

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Prefix every bearer token starts with
pub const TOKEN_PREFIX: &str = "tutor_";

/// Claims signed into a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "uid")]
    pub user_id: String,

    #[serde(rename = "phone", default)]
    pub phone_number: String,

    /// Unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

impl TokenClaims {
    /// Claims issued now and valid for `ttl`
    pub fn new(user_id: impl Into<String>, phone_number: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            phone_number: phone_number.into(),
            expires_at: (now + ttl).timestamp(),
            issued_at: now.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().timestamp()
    }

    /// Sign the claims into a prefixed bearer token
    pub fn sign(&self, key: &EncodingKey) -> Result<String> {
        let jwt = encode(&Header::default(), self, key)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))?;
        Ok(format!("{}{}", TOKEN_PREFIX, jwt))
    }
}

/// The JWT part of a bearer token, if the token carries the prefix and a
/// plausible payload
pub fn strip_token_prefix(token: &str) -> Option<&str> {
    token
        .strip_prefix(TOKEN_PREFIX)
        .filter(|jwt| jwt.len() > 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_token_prefix() {
        assert_eq!(
            strip_token_prefix("tutor_eyJhbGciOiJIUzI1NiJ9"),
            Some("eyJhbGciOiJIUzI1NiJ9")
        );
        assert_eq!(strip_token_prefix("bearer_eyJhbGciOiJIUzI1NiJ9"), None);
        assert_eq!(strip_token_prefix("tutor_"), None);
    }

    #[test]
    fn test_sign_adds_prefix() {
        let claims = TokenClaims::new("u1", "09120000001", Duration::minutes(5));
        let token = claims
            .sign(&EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"))
            .unwrap();
        assert!(strip_token_prefix(&token).is_some());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry() {
        let claims = TokenClaims::new("u1", "09120000001", Duration::hours(-1));
        assert!(claims.is_expired());
        assert!(claims.expires_at < claims.issued_at);
    }
}
