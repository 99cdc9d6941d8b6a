//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Redis cache over a single multiplexed connection.
///
/// `ConnectionManager` is cheap to clone and safe to share between request
/// tasks; it reconnects on its own after a dropped connection. Every command
/// carries `op_timeout`. Errors and timeouts are logged and degrade to a miss.
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails or times out.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = timeout(op_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::ConnectionError("Redis connect timed out".to_string()))?
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        let mut test_conn = manager.clone();
        timeout(op_timeout, test_conn.ping::<()>())
            .await
            .map_err(|_| CacheError::ConnectionError("Redis PING timed out".to_string()))?
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            conn: manager,
            op_timeout,
        })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();

        match timeout(self.op_timeout, conn.get::<_, Option<String>>(key)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(key, error = %e, "Redis GET failed, treating as miss");
                Ok(None)
            }
            Err(_) => {
                warn!(key, "Redis GET timed out, treating as miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        // SET EX takes whole seconds; never store with a zero expiry
        let ttl_seconds = ttl.as_secs().max(1);

        match timeout(
            self.op_timeout,
            conn.set_ex::<_, _, ()>(key, value, ttl_seconds),
        )
        .await
        {
            Ok(Ok(())) => {
                debug!(key, ttl_seconds, "Redis SET");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(key, error = %e, "Redis SET failed");
                Ok(())
            }
            Err(_) => {
                warn!(key, "Redis SET timed out");
                Ok(())
            }
        }
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();

        match timeout(self.op_timeout, conn.del::<_, i32>(key)).await {
            Ok(Ok(deleted)) => {
                if deleted > 0 {
                    debug!(key, "Redis DEL");
                }
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(key, error = %e, "Redis DEL failed");
                Ok(())
            }
            Err(_) => {
                warn!(key, "Redis DEL timed out");
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        matches!(
            timeout(self.op_timeout, conn.ping::<()>()).await,
            Ok(Ok(()))
        )
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
