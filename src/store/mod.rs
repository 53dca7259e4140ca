// src/store/mod.rs
//! Cache store: the two tables downstream readers poll.
//!
//! - `crypto_cache`: one row per named view, upserted on `cache_key`
//! - `crypto_cache_status`: a single row (`id = 1`) describing the latest run

pub mod memory;
pub mod redis_backend;
pub mod status;
pub mod supabase;
pub mod writer;

pub use memory::MemoryStore;
pub use status::StatusRecorder;
pub use writer::{CacheWriter, View};

use crate::config::{CacheBackend, Config};
use crate::error::{RefreshError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const CACHE_TABLE: &str = "crypto_cache";
pub const STATUS_TABLE: &str = "crypto_cache_status";
pub const STATUS_ROW_ID: i64 = 1;
pub const RESPONSE_STATUS_SUCCESS: &str = "success";

/// One named, pre-aggregated view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub endpoint_url: String,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub response_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Updating,
    Complete,
    Partial,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Updating => "updating",
            RunStatus::Complete => "complete",
            RunStatus::Partial => "partial",
            RunStatus::Error => "error",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The singleton status row.
///
/// `last_full_update` is omitted from writes unless the run completed, so backends keep the
/// previously stored value on every other write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub id: i64,
    pub status: RunStatus,
    pub successful_endpoints: u32,
    pub failed_endpoints: u32,
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_full_update: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Backend that persists cache entries and the status row.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Insert or fully replace the entry for `entry.cache_key`.
    async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()>;

    /// Insert or replace the status row, keeping the stored `last_full_update` when the
    /// incoming row has none.
    async fn upsert_status(&self, status: &RefreshStatus) -> Result<()>;
}

/// Opens the backend selected by `config.cache_backend`.
pub async fn connect(config: &Config) -> Result<Arc<dyn CacheStore>> {
    match config.cache_backend {
        CacheBackend::Supabase => {
            let url = config.supabase_url.as_deref().ok_or_else(|| {
                RefreshError::Configuration("SUPABASE_URL is required".to_string())
            })?;
            let key = config.supabase_service_role_key.as_deref().ok_or_else(|| {
                RefreshError::Configuration("SUPABASE_SERVICE_ROLE_KEY is required".to_string())
            })?;
            Ok(Arc::new(supabase::SupabaseStore::new(url, key)?))
        }
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                RefreshError::Configuration("REDIS_URL is required".to_string())
            })?;
            Ok(Arc::new(redis_backend::RedisStore::new(url).await?))
        }
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
