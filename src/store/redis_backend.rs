// src/store/redis_backend.rs
//! Redis backend for deployments whose readers poll Redis instead of Postgres.
//!
//! Entries live under `crypto_cache:<cache_key>` as JSON strings without a Redis expiry;
//! staleness stays advisory through `expires_at`, same as the SQL table. The status row is
//! the hash `crypto_cache_status`.

use super::{CacheEntry, CacheStore, RefreshStatus, CACHE_TABLE, STATUS_TABLE};
use crate::config::env::redact_url;
use crate::error::{RefreshError, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::fmt;

/// Uses a `ConnectionManager` for automatic reconnection.
#[derive(Clone)]
pub struct RedisStore {
    conn_manager: ConnectionManager,
    /// Password already stripped
    redis_url: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager instance>")
            .finish()
    }
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let display_url = redact_url(redis_url);
        info!("Initializing Redis connection manager for URL: {}", display_url);
        let client = redis::Client::open(redis_url)
            .map_err(|e| RefreshError::Configuration(format!("invalid REDIS_URL: {}", e)))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            RefreshError::StoreWrite(format!("Failed to create Redis ConnectionManager: {}", e))
        })?;
        info!("Redis ConnectionManager initialized successfully");
        Ok(Self {
            conn_manager,
            redis_url: display_url,
        })
    }

    pub fn entry_key(cache_key: &str) -> String {
        format!("{}:{}", CACHE_TABLE, cache_key)
    }

    fn status_fields(status: &RefreshStatus) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("id", status.id.to_string()),
            ("status", status.status.as_str().to_string()),
            ("successful_endpoints", status.successful_endpoints.to_string()),
            ("failed_endpoints", status.failed_endpoints.to_string()),
            ("updated_at", status.updated_at.to_rfc3339()),
        ];
        if let Some(message) = &status.error_message {
            fields.push(("error_message", message.clone()));
        }
        if let Some(last_full_update) = status.last_full_update {
            fields.push(("last_full_update", last_full_update.to_rfc3339()));
        }
        fields
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()> {
        let key = Self::entry_key(&entry.cache_key);
        let value = serde_json::to_string(entry)?;
        let mut conn = self.conn_manager.clone();
        conn.set::<_, _, ()>(&key, value).await.map_err(|e| {
            error!("Redis SET error for key {}: {}", key, e);
            RefreshError::StoreWrite(format!("Redis SET error for key {}: {}", key, e))
        })?;
        debug!("Redis SET success for key: {}", key);
        Ok(())
    }

    async fn upsert_status(&self, status: &RefreshStatus) -> Result<()> {
        let fields = Self::status_fields(status);
        let mut pipe = redis::pipe();
        pipe.atomic().hset_multiple(STATUS_TABLE, &fields[..]).ignore();
        if status.error_message.is_none() {
            pipe.hdel(STATUS_TABLE, "error_message").ignore();
        }

        let mut conn = self.conn_manager.clone();
        pipe.query_async::<_, ()>(&mut conn).await.map_err(|e| {
            error!("Redis status update failed: {}", e);
            RefreshError::StatusRecord(format!("Redis HSET error for {}: {}", STATUS_TABLE, e))
        })
    }
}
