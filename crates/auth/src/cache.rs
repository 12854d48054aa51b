//! TTL key-value cache backing pending OTP codes
//!
//! The cache is the only record of a pending code. A failed `set` or `get`
//! is fatal for the OTP flow and surfaces as [`AuthError::Cache`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};

/// Key-value store with per-entry expiry
#[async_trait]
pub trait OtpCache: Send + Sync {
    /// Store a value, replacing any previous one, for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Fetch a live value; None when missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

// =============================================================================
// Redis
// =============================================================================

/// Redis-backed cache using `SET ... EX`
///
/// Every command is bounded by `command_timeout`; a server that accepts the
/// connection but stops answering yields [`AuthError::Cache`].
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connect to a Redis server, failing after `connect_timeout`
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| AuthError::cache(format!("connect to {} timed out", url)))??;

        info!(url, ?command_timeout, "connected to redis");
        Ok(Self {
            conn,
            command_timeout,
        })
    }

    async fn bounded<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(command, timeout = ?self.command_timeout, "redis command timed out");
                Err(AuthError::cache(format!(
                    "redis {} timed out after {:?}",
                    command, self.command_timeout
                )))
            }
        }
    }
}

#[async_trait]
impl OtpCache for RedisCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded("SET", conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded("GET", conn.get::<_, Option<String>>(key)).await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local cache for development and tests
///
/// Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an entry as if its TTL had elapsed
    pub fn expire(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>>> {
        self.entries
            .lock()
            .map_err(|_| AuthError::cache("memory cache lock poisoned"))
    }
}

#[async_trait]
impl OtpCache for MemoryCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now() + ttl;
        self.lock()?
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                debug!(key, "cache entry expired");
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
