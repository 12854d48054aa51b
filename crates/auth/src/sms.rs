//! SMS gateways for delivering OTP codes
//!
//! Delivery is best effort. Callers downgrade a [`SmsError`] to a failed
//! delivery report instead of propagating it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};
use tutor_config::SmsConfig;

/// SMS delivery errors
#[derive(Debug, Error)]
pub enum SmsError {
    /// Gateway misconfigured or client could not be built
    #[error("sms gateway init failed: {0}")]
    Init(String),

    /// Transport failure or timeout
    #[error("sms request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway answered with a non-success status
    #[error("sms gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Something that can deliver a text message to a phone number
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send a message, returning the gateway's response payload
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError>;

    /// Gateway name for logging
    fn name(&self) -> &'static str;
}

/// Message body carrying an OTP code
pub fn otp_message(code: &str) -> String {
    format!("Tutor verification code: {}", code)
}

/// Mask every digit so a message can be logged without its code
pub fn redact_digits(message: &str) -> String {
    message
        .chars()
        .map(|c| if c.is_ascii_digit() { '*' } else { c })
        .collect()
}

// =============================================================================
// Kavenegar
// =============================================================================

/// Kavenegar HTTP gateway
///
/// Posts a form with `sender`, `receptor` and `message` to
/// `{base_url}{api_key}{send_path}`.
#[derive(Debug, Clone)]
pub struct KavenegarGateway {
    client: reqwest::Client,
    url: String,
    sender: String,
}

impl KavenegarGateway {
    /// Build a gateway from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be built
    pub fn new(config: &SmsConfig) -> Result<Self, SmsError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SmsError::Init("kavenegar api_key is not set".into()))?;

        let client = reqwest::Client::builder()
            .user_agent("tutor/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| SmsError::Init(format!("Kavenegar HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}{}{}", config.base_url, api_key, config.send_path),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for KavenegarGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError> {
        let form = [
            ("sender", self.sender.as_str()),
            ("receptor", phone),
            ("message", message),
        ];
        let response = self.client.post(&self.url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(phone, status = status.as_u16(), "kavenegar rejected sms");
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        info!(phone, "sms sent");
        Ok(payload)
    }

    fn name(&self) -> &'static str {
        "kavenegar"
    }
}

// =============================================================================
// Log
// =============================================================================

/// Writes messages to the log instead of sending them
///
/// The message is masked at info; the full text only appears at debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogGateway;

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError> {
        info!(phone, message = %redact_digits(message), "sms (log gateway)");
        debug!(phone, message, "sms (log gateway) full text");
        Ok(serde_json::json!({ "status": "logged" }))
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_otp_message() {
        assert_eq!(otp_message("12345"), "Tutor verification code: 12345");
    }

    #[test]
    fn test_redact_digits_hides_code() {
        let redacted = redact_digits(&otp_message("40721"));
        assert_eq!(redacted, "Tutor verification code: *****");
        assert!(!redacted.contains("40721"));
    }

    #[test]
    fn test_kavenegar_requires_api_key() {
        let result = KavenegarGateway::new(&SmsConfig::default());
        assert!(matches!(result, Err(SmsError::Init(_))));
    }

    #[test]
    fn test_kavenegar_url() {
        let config = SmsConfig {
            api_key: Some("KEY".into()),
            sender: "1000".into(),
            ..Default::default()
        };
        let gateway = KavenegarGateway::new(&config).unwrap();
        assert_eq!(gateway.url, "https://api.kavenegar.com/v1/KEY/sms/send.json");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_http_error() {
        let config = SmsConfig {
            base_url: "http://127.0.0.1:1/".into(),
            api_key: Some("KEY".into()),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let gateway = KavenegarGateway::new(&config).unwrap();
        let result = gateway.send("09120000001", "hi").await;
        assert!(matches!(result, Err(SmsError::Http(_))));
    }

    #[tokio::test]
    async fn test_log_gateway() {
        let payload = LogGateway.send("09120000001", "hi").await.unwrap();
        assert_eq!(payload["status"], "logged");
    }
}
