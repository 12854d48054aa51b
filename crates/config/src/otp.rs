//! One-time password, cache and SMS gateway configuration

use std::time::Duration;

use serde::Deserialize;

/// OTP issuance settings
///
/// ```toml
/// [otp]
/// digits = 5
/// ttl = "2m"
/// key_prefix = "otp:"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Number of decimal digits in a generated code
    pub digits: usize,

    /// How long a code stays verifiable
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Cache key prefix; the phone number is appended
    pub key_prefix: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            digits: 5,
            ttl: Duration::from_secs(120),
            key_prefix: "otp:".to_string(),
        }
    }
}

impl OtpConfig {
    /// Cache key for a phone number
    pub fn key_for(&self, phone: &str) -> String {
        format!("{}{}", self.key_prefix, phone)
    }
}

/// Cache backend selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// External Redis server (default)
    #[default]
    Redis,
    /// Process-local map, for development and tests
    Memory,
}

/// TTL cache configuration
///
/// ```toml
/// [cache]
/// backend = "redis"
/// url = "redis://127.0.0.1:6379/0"
/// connect_timeout = "3s"
/// command_timeout = "2s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub url: String,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Upper bound on a single GET or SET round trip
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            url: "redis://127.0.0.1:6379/0".to_string(),
            connect_timeout: Duration::from_secs(3),
            command_timeout: Duration::from_secs(2),
        }
    }
}

/// SMS provider selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Kavenegar HTTP API
    Kavenegar,
    /// Log the message instead of sending it (default)
    #[default]
    Log,
}

/// SMS gateway configuration
///
/// ```toml
/// [sms]
/// provider = "kavenegar"
/// base_url = "https://api.kavenegar.com/v1/"
/// api_key = "..."
/// send_path = "/sms/send.json"
/// sender = "10004346"
/// timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub provider: SmsProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub send_path: String,
    pub sender: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Log,
            base_url: "https://api.kavenegar.com/v1/".to_string(),
            api_key: None,
            send_path: "/sms/send.json".to_string(),
            sender: String::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_key_for_phone() {
        let config = OtpConfig::default();
        assert_eq!(config.key_for("09123456789"), "otp:09123456789");
    }

    #[test]
    fn test_cache_memory_backend() {
        let config: CacheConfig = toml::from_str(r#"backend = "memory""#).unwrap();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.command_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_cache_command_timeout() {
        let config: CacheConfig = toml::from_str(r#"command_timeout = "750ms""#).unwrap();
        assert_eq!(config.command_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_sms_kavenegar() {
        let toml = r#"
provider = "kavenegar"
api_key = "abc"
sender = "1000"
timeout = "10s"
"#;
        let config: SmsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.provider, SmsProvider::Kavenegar);
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.send_path, "/sms/send.json");
    }
}
