//! Authentication configuration

use std::time::Duration;

use serde::Deserialize;

/// Minimum secret length accepted for HS256 signing
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Authentication configuration
///
/// ```toml
/// [auth]
/// jwt_secret = "your-secret-key-at-least-32-characters-long"
/// jwt_expires_in = "24h"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret for signing tokens
    /// When unset a random secret is generated at startup
    pub jwt_secret: Option<String>,

    /// JWT token expiration time
    /// Default: 24 hours
    #[serde(with = "humantime_serde")]
    pub jwt_expires_in: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expires_in: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humantime_expiry() {
        let config: AuthConfig = toml::from_str(r#"jwt_expires_in = "2h""#).unwrap();
        assert_eq!(config.jwt_expires_in, Duration::from_secs(7200));
        assert!(config.jwt_secret.is_none());
    }
}
