// src/store/writer.rs
//! Cache entry writer: stamps timestamps/TTL and upserts through the backend.

use super::{CacheEntry, CacheStore, RESPONSE_STATUS_SUCCESS};
use crate::error::{RefreshError, Result};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::{debug, error};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A derived view ready to be cached.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub cache_key: &'static str,
    pub endpoint: &'static str,
    pub data: Value,
}

impl View {
    pub fn new(cache_key: &'static str, endpoint: &'static str, data: Value) -> Self {
        Self {
            cache_key,
            endpoint,
            data,
        }
    }
}

#[derive(Clone)]
pub struct CacheWriter {
    store: Arc<dyn CacheStore>,
    ttl: chrono::Duration,
}

impl CacheWriter {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Result<Self> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| RefreshError::Configuration(format!("cache TTL out of range: {}", e)))?;
        Ok(Self { store, ttl })
    }

    pub fn entry_at(
        &self,
        cache_key: &str,
        endpoint: &str,
        data: Value,
        now: DateTime<Utc>,
    ) -> CacheEntry {
        CacheEntry {
            cache_key: cache_key.to_string(),
            endpoint_url: endpoint.to_string(),
            data,
            updated_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            response_status: RESPONSE_STATUS_SUCCESS.to_string(),
        }
    }

    pub async fn write(&self, cache_key: &str, endpoint: &str, data: Value) -> Result<()> {
        self.write_at(cache_key, endpoint, data, Utc::now()).await
    }

    pub async fn write_at(
        &self,
        cache_key: &str,
        endpoint: &str,
        data: Value,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = self.entry_at(cache_key, endpoint, data, now);
        match self.store.upsert_entry(&entry).await {
            Ok(()) => {
                debug!("Cached {} (expires {})", cache_key, entry.expires_at);
                Ok(())
            }
            Err(e) => {
                error!("❌ Failed to cache {}: {}", cache_key, e);
                Err(match e {
                    RefreshError::StoreWrite(_) => e,
                    other => RefreshError::StoreWrite(format!("{}: {}", cache_key, other)),
                })
            }
        }
    }

    /// Writes a group's views concurrently. The first failure fails the batch; writes that
    /// already landed stay in place.
    pub async fn write_all(&self, views: Vec<View>) -> Result<usize> {
        let count = views.len();
        try_join_all(
            views
                .into_iter()
                .map(|view| async move { self.write(view.cache_key, view.endpoint, view.data).await }),
        )
        .await?;
        Ok(count)
    }
}
