//! Tutor Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config: local SQLite database, Redis on
//! localhost, and SMS messages written to the log instead of being sent.
//!
//! ```
//! use tutor_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[otp]\ndigits = 6").unwrap();
//! assert_eq!(config.otp.digits, 6);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! port = 8000
//!
//! [database]
//! path = "data/tutor.db"
//!
//! [auth]
//! jwt_secret = "change-me-to-a-long-random-string-please"
//!
//! [otp]
//! digits = 5
//! ttl = "2m"
//!
//! [sms]
//! provider = "kavenegar"
//! api_key = "..."
//! sender = "10004346"
//! ```

mod auth;
mod database;
mod error;
mod logging;
mod otp;
mod pagination;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use auth::{AuthConfig, MIN_JWT_SECRET_LEN};
pub use database::DatabaseConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use otp::{CacheBackend, CacheConfig, OtpConfig, SmsConfig, SmsProvider};
pub use pagination::PaginationConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server
    pub server: ServerConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Relational store
    pub database: DatabaseConfig,

    /// Token signing
    pub auth: AuthConfig,

    /// One-time password issuance
    pub otp: OtpConfig,

    /// TTL cache holding OTP codes
    pub cache: CacheConfig,

    /// SMS gateway
    pub sms: SmsConfig,

    /// List pagination
    pub pagination: PaginationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
