//! One-time password issuance and verification
//!
//! A code is a string of uniformly random decimal digits stored in the
//! cache under `{key_prefix}{phone}` for the configured TTL. Issuing again
//! overwrites the pending code. Verification compares against the cached
//! value and leaves it in place, so a correct code stays valid until the
//! TTL elapses.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use tutor_config::OtpConfig;

use crate::cache::OtpCache;
use crate::error::Result;
use crate::sms::{SmsGateway, otp_message};
use crate::validation::{validate_code, validate_phone};

/// Outcome of handing a code to the SMS gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SmsDelivery {
    /// Gateway accepted the message
    Sent { response: serde_json::Value },
    /// Gateway failed; the code is still stored and verifiable
    Failed { reason: String },
}

impl SmsDelivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Issues and verifies OTP codes
pub struct OtpService {
    config: OtpConfig,
    cache: Arc<dyn OtpCache>,
    gateway: Arc<dyn SmsGateway>,
}

impl std::fmt::Debug for OtpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpService")
            .field("digits", &self.config.digits)
            .field("ttl", &self.config.ttl)
            .field("cache", &self.cache.name())
            .field("gateway", &self.gateway.name())
            .finish()
    }
}

impl OtpService {
    pub fn new(
        config: &OtpConfig,
        cache: Arc<dyn OtpCache>,
        gateway: Arc<dyn SmsGateway>,
    ) -> Self {
        Self {
            config: config.clone(),
            cache,
            gateway,
        }
    }

    /// Number of digits in an issued code
    pub fn digits(&self) -> usize {
        self.config.digits
    }

    /// Generate, store and send a code
    ///
    /// # Errors
    ///
    /// Fails on an invalid phone number or when the cache cannot store the
    /// code. Gateway failures are reported through [`SmsDelivery::Failed`].
    pub async fn issue(&self, phone: &str) -> Result<SmsDelivery> {
        validate_phone(phone)?;

        let code = generate_code(self.config.digits);
        self.cache
            .set(&self.config.key_for(phone), &code, self.config.ttl)
            .await?;
        info!(phone, ttl = ?self.config.ttl, "otp stored");

        let delivery = match self.gateway.send(phone, &otp_message(&code)).await {
            Ok(response) => SmsDelivery::Sent { response },
            Err(e) => {
                warn!(phone, gateway = self.gateway.name(), error = %e, "otp delivery failed");
                SmsDelivery::Failed {
                    reason: e.to_string(),
                }
            }
        };
        Ok(delivery)
    }

    /// Check a submitted code against the pending one
    ///
    /// False when no code is pending. The code is not consumed.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<bool> {
        validate_phone(phone)?;
        validate_code(code, self.config.digits)?;

        let pending = self.cache.get(&self.config.key_for(phone)).await?;
        Ok(pending.as_deref() == Some(code))
    }
}

/// `digits` uniformly random decimal digits
pub fn generate_code(digits: usize) -> String {
    let mut rng = rand::rng();
    (0..digits)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::AuthError;
    use crate::test_utils::{FailingGateway, RecordingGateway};
    use std::time::Duration;

    const PHONE: &str = "09121111111";

    fn service(
        cache: Arc<MemoryCache>,
        gateway: Arc<dyn SmsGateway>,
    ) -> OtpService {
        OtpService::new(&OtpConfig::default(), cache, gateway)
    }

    #[test]
    fn test_generate_code() {
        for _ in 0..50 {
            let code = generate_code(5);
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(generate_code(8).len(), 8);
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let cache = Arc::new(MemoryCache::new());
        let gateway = Arc::new(RecordingGateway::new());
        let otp = service(cache.clone(), gateway.clone());

        let delivery = otp.issue(PHONE).await.unwrap();
        assert!(delivery.is_sent());

        let code = gateway.last_code_for(PHONE).unwrap();
        assert_eq!(code.len(), 5);
        assert!(otp.verify(PHONE, &code).await.unwrap());

        let wrong = if code == "00000" { "11111" } else { "00000" };
        assert!(!otp.verify(PHONE, wrong).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_does_not_consume() {
        let cache = Arc::new(MemoryCache::new());
        let gateway = Arc::new(RecordingGateway::new());
        let otp = service(cache, gateway.clone());

        otp.issue(PHONE).await.unwrap();
        let code = gateway.last_code_for(PHONE).unwrap();
        assert!(otp.verify(PHONE, &code).await.unwrap());
        assert!(otp.verify(PHONE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_code_is_invalid() {
        let cache = Arc::new(MemoryCache::new());
        let gateway = Arc::new(RecordingGateway::new());
        let otp = service(cache.clone(), gateway.clone());

        otp.issue(PHONE).await.unwrap();
        let code = gateway.last_code_for(PHONE).unwrap();
        cache.expire(&format!("otp:{}", PHONE));
        assert!(!otp.verify(PHONE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_reissue_overwrites() {
        let cache = Arc::new(MemoryCache::new());
        let gateway = Arc::new(RecordingGateway::new());
        let otp = service(cache.clone(), gateway.clone());

        otp.issue(PHONE).await.unwrap();
        otp.issue(PHONE).await.unwrap();
        let latest = gateway.last_code_for(PHONE).unwrap();

        let stored = cache.get(&format!("otp:{}", PHONE)).await.unwrap();
        assert_eq!(stored.as_deref(), Some(latest.as_str()));
        assert!(otp.verify(PHONE, &latest).await.unwrap());
    }

    #[tokio::test]
    async fn test_gateway_failure_still_stores_code() {
        let cache = Arc::new(MemoryCache::new());
        let otp = service(cache.clone(), Arc::new(FailingGateway));

        let delivery = otp.issue(PHONE).await.unwrap();
        assert!(matches!(delivery, SmsDelivery::Failed { .. }));

        let stored = cache.get(&format!("otp:{}", PHONE)).await.unwrap().unwrap();
        assert!(otp.verify(PHONE, &stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let otp = service(Arc::new(MemoryCache::new()), Arc::new(RecordingGateway::new()));

        let err = otp.issue("12345").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "phone_number", .. }));

        let err = otp.verify(PHONE, "12a45").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "otp_code", .. }));
    }

    #[tokio::test]
    async fn test_cache_failure_is_fatal() {
        struct DownCache;

        #[async_trait::async_trait]
        impl OtpCache for DownCache {
            async fn set(&self, _: &str, _: &str, _: Duration) -> Result<()> {
                Err(AuthError::cache("connection refused"))
            }
            async fn get(&self, _: &str) -> Result<Option<String>> {
                Err(AuthError::cache("connection refused"))
            }
            fn name(&self) -> &'static str {
                "down"
            }
        }

        let gateway = Arc::new(RecordingGateway::new());
        let otp = OtpService::new(&OtpConfig::default(), Arc::new(DownCache), gateway.clone());

        assert!(matches!(otp.issue(PHONE).await, Err(AuthError::Cache(_))));
        assert!(matches!(otp.verify(PHONE, "12345").await, Err(AuthError::Cache(_))));
        assert!(gateway.sent().is_empty());
    }
}
