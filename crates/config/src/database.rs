//! Relational store configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Database configuration
///
/// ```toml
/// [database]
/// path = "~/.tutor/tutor.db"   # default
/// max_connections = 5          # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    /// Default: "~/.tutor/tutor.db" (expanded at runtime)
    pub path: Option<PathBuf>,

    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Get the database path, expanding ~ to home directory
    pub fn db_path(&self) -> PathBuf {
        if let Some(ref path) = self.path {
            expand_tilde(path)
        } else {
            dirs::home_dir()
                .map(|h| h.join(".tutor").join("tutor.db"))
                .unwrap_or_else(|| PathBuf::from("./data/tutor.db"))
        }
    }
}

/// Expand ~ to home directory
fn expand_tilde(path: &Path) -> PathBuf {
    path.to_str()
        .and_then(|s| s.strip_prefix("~/"))
        .and_then(|stripped| dirs::home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| path.to_path_buf())
}
