//! Redis cache for read-mostly data and rate limiting.

use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use common::{AppError, AppResult, CacheConfig};
use domain::Category;

/// Cache key for the full category list
const CACHE_KEY_CATEGORIES: &str = "categories:all";

/// Cache key prefix for rate limiting
const CACHE_PREFIX_RATE_LIMIT: &str = "rate_limit:";

fn cache_error(op: &str, key: &str, err: RedisError) -> AppError {
    warn!("Redis {} error for key {}: {}", op, key, err);
    AppError::Cache(err)
}

/// Redis cache wrapper.
pub struct Cache {
    conn: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &CacheConfig) -> Result<Self, RedisError> {
        debug!("Connecting to Redis");
        let client = redis::Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            default_ttl: config.default_ttl_seconds,
        })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(key).await.map_err(|e| cache_error("get", key, e))?;

        match result {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    // Stale layout after a deploy; treat as a miss
                    warn!("Failed to deserialize cached value for key {}: {}", key, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Set a value in cache with the default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Set a value in cache with custom TTL.
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))?;
        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(|e| cache_error("set", key, e))
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| cache_error("delete", key, e))
    }

    /// Round-trip to the server.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| cache_error("ping", "-", e))
    }

    // =========================================================================
    // Category Cache Operations
    // =========================================================================

    pub async fn get_categories(&self) -> AppResult<Option<Vec<Category>>> {
        self.get(CACHE_KEY_CATEGORIES).await
    }

    pub async fn set_categories(&self, categories: &[Category]) -> AppResult<()> {
        self.set(CACHE_KEY_CATEGORIES, &categories).await
    }

    /// Drop the cached list after any category write.
    pub async fn invalidate_categories(&self) -> AppResult<()> {
        self.delete(CACHE_KEY_CATEGORIES).await
    }

    // =========================================================================
    // Rate Limiting
    // =========================================================================

    /// Increment the counter for `identifier` within a fixed window.
    /// Returns (current_count, allowed).
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.conn.clone();

        let count: u64 = conn
            .incr(&key, 1u64)
            .await
            .map_err(|e| cache_error("incr", &key, e))?;

        // First hit opens the window
        if count == 1 {
            conn.expire::<_, ()>(&key, window_seconds as i64)
                .await
                .map_err(|e| cache_error("expire", &key, e))?;
        }

        Ok((count, count <= max_requests))
    }
}
