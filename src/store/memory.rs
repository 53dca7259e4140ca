// src/store/memory.rs
//! Process-local backend with the same upsert semantics as the database tables.

use super::{CacheEntry, CacheStore, RefreshStatus, STATUS_ROW_ID};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
    status: DashMap<i64, RefreshStatus>,
    entry_writes: AtomicUsize,
    status_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, cache_key: &str) -> Option<CacheEntry> {
        self.entries.get(cache_key).map(|e| e.value().clone())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn status(&self) -> Option<RefreshStatus> {
        self.status.get(&STATUS_ROW_ID).map(|s| s.value().clone())
    }

    /// Total upserts received, including overwrites
    pub fn entry_writes(&self) -> usize {
        self.entry_writes.load(Ordering::Relaxed)
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.entry_writes.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(entry.cache_key.clone(), entry.clone());
        debug!("memory store: upserted {}", entry.cache_key);
        Ok(())
    }

    async fn upsert_status(&self, status: &RefreshStatus) -> Result<()> {
        self.status_writes.fetch_add(1, Ordering::Relaxed);
        let mut row = status.clone();
        if row.last_full_update.is_none() {
            row.last_full_update = self
                .status
                .get(&status.id)
                .and_then(|previous| previous.last_full_update);
        }
        self.status.insert(status.id, row);
        Ok(())
    }
}
