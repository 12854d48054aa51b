//! Configuration validation
//!
//! Validates config consistency:
//! - OTP digit count and TTL are usable
//! - JWT secret is long enough when set
//! - Cache commands are bounded by a positive timeout
//! - SMS provider has the credentials it needs
//! - Pagination bounds are ordered

use crate::Config;
use crate::auth::MIN_JWT_SECRET_LEN;
use crate::error::{ConfigError, Result};
use crate::otp::{CacheBackend, SmsProvider};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_otp(config)?;
    validate_auth(config)?;
    validate_cache(config)?;
    validate_sms(config)?;
    validate_pagination(config)?;
    Ok(())
}

fn validate_otp(config: &Config) -> Result<()> {
    if !(4..=10).contains(&config.otp.digits) {
        return Err(ConfigError::invalid_value(
            "otp",
            "digits",
            "must be between 4 and 10",
        ));
    }
    if config.otp.ttl.is_zero() {
        return Err(ConfigError::invalid_value("otp", "ttl", "must be positive"));
    }
    Ok(())
}

fn validate_auth(config: &Config) -> Result<()> {
    if let Some(ref secret) = config.auth.jwt_secret
        && secret.len() < MIN_JWT_SECRET_LEN
    {
        return Err(ConfigError::invalid_value(
            "auth",
            "jwt_secret",
            format!("must be at least {} characters", MIN_JWT_SECRET_LEN),
        ));
    }
    Ok(())
}

fn validate_cache(config: &Config) -> Result<()> {
    if config.cache.backend == CacheBackend::Redis && config.cache.url.is_empty() {
        return Err(ConfigError::missing_field("cache", "url"));
    }
    if config.cache.command_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "cache",
            "command_timeout",
            "must be positive",
        ));
    }
    Ok(())
}

fn validate_sms(config: &Config) -> Result<()> {
    if config.sms.provider != SmsProvider::Kavenegar {
        return Ok(());
    }
    if config.sms.api_key.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::missing_field("sms", "api_key"));
    }
    if config.sms.sender.is_empty() {
        return Err(ConfigError::missing_field("sms", "sender"));
    }
    Ok(())
}

fn validate_pagination(config: &Config) -> Result<()> {
    let p = &config.pagination;
    if p.page_size == 0 || p.page_size > p.max_page_size {
        return Err(ConfigError::invalid_value(
            "pagination",
            "page_size",
            format!("must be between 1 and max_page_size ({})", p.max_page_size),
        ));
    }
    Ok(())
}
