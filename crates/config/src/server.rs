//! HTTP server configuration

use serde::Deserialize;

/// HTTP server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 8000
/// allowed_origins = ["https://app.example.com"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    /// Default: "0.0.0.0"
    pub host: String,

    /// Port to listen on
    /// Default: 8000
    pub port: u16,

    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
