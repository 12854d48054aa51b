//! Authenticated user information

use serde::{Deserialize, Serialize};

use crate::claims::TokenClaims;

/// The user behind a validated bearer token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User ID
    pub id: String,

    /// Registered phone number
    pub phone_number: String,
}

impl UserInfo {
    pub fn new(id: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Build from validated token claims
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            id: claims.user_id.clone(),
            phone_number: claims.phone_number.clone(),
        }
    }
}
