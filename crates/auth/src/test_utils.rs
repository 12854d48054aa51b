//! Test utilities for generating tokens and faking collaborators
//!
//! These helpers create valid signed JWTs for testing authentication flows.
//! Use these instead of mocking - they test the real validation code path.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::EncodingKey;

use crate::claims::TokenClaims;
use crate::sms::{SmsError, SmsGateway};

/// Test secret for JWT signing (32 bytes for HS256)
pub const TEST_SECRET: &[u8] = b"test-secret-key-32-bytes-long!!!";

/// Create a test token valid for one hour
///
/// # Example
///
/// ```
/// use tutor_auth::test_utils::{create_test_token, TEST_SECRET};
/// use tutor_auth::LocalJwtProvider;
///
/// let token = create_test_token("user-1", "09120000001");
/// let provider = LocalJwtProvider::new(TEST_SECRET);
/// // Token is valid and can be verified
/// ```
pub fn create_test_token(user_id: &str, phone_number: &str) -> String {
    create_test_token_with_options(user_id, phone_number, TEST_SECRET, Duration::hours(1))
}

/// Create a test token with full control over secret and lifetime
pub fn create_test_token_with_options(
    user_id: &str,
    phone_number: &str,
    secret: &[u8],
    expires_in: Duration,
) -> String {
    TokenClaims::new(user_id, phone_number, expires_in)
        .sign(&EncodingKey::from_secret(secret))
        .expect("failed to sign test token")
}

/// SMS gateway that records every message instead of sending it
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(phone, message)` pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Digits of the most recent message sent to a phone number
    pub fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, message)| message.chars().filter(char::is_ascii_digit).collect())
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), message.to_string()));
        }
        Ok(serde_json::json!({ "status": "recorded" }))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// SMS gateway that always fails
#[derive(Debug, Default)]
pub struct FailingGateway;

#[async_trait]
impl SmsGateway for FailingGateway {
    async fn send(&self, _phone: &str, _message: &str) -> Result<serde_json::Value, SmsError> {
        Err(SmsError::Rejected {
            status: 503,
            body: "gateway unavailable".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalJwtProvider;
    use crate::provider::AuthProvider;

    #[tokio::test]
    async fn test_create_test_token() {
        let provider = LocalJwtProvider::new(TEST_SECRET);
        let token = create_test_token("user-1", "09120000001");

        let user = provider.validate(&token).await.unwrap();
        assert_eq!(user.id, "user-1");
    }

    #[test]
    fn test_token_format() {
        let token = create_test_token("user-1", "09120000001");
        assert!(token.starts_with("tutor_"));
        assert!(token.len() > 100); // JWTs are typically longer
    }

    #[tokio::test]
    async fn test_recording_gateway() {
        let gateway = RecordingGateway::new();
        gateway.send("09120000001", "code: 12345").await.unwrap();
        gateway.send("09120000002", "code: 99999").await.unwrap();
        gateway.send("09120000001", "code: 54321").await.unwrap();

        assert_eq!(gateway.sent().len(), 3);
        assert_eq!(gateway.last_code_for("09120000001").as_deref(), Some("54321"));
        assert_eq!(gateway.last_code_for("09129999999"), None);
    }
}
