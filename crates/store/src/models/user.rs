//! User models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, keyed by phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone_number: String,
    /// Argon2 PHC string; None until a password is set
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub referral_code: String,
    /// Id of the user whose referral code was used at signup
    pub referred_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a random id
    pub fn new(phone_number: impl Into<String>, referral_code: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            phone_number: phone_number.into(),
            password_hash: None,
            referral_code: referral_code.into(),
            referred_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn referred_by(mut self, user_id: impl Into<String>) -> Self {
        self.referred_by = Some(user_id.into());
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }
}
