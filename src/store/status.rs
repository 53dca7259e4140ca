// src/store/status.rs
//! Best-effort writer for the singleton `crypto_cache_status` row.

use super::{CacheStore, RefreshStatus, RunStatus, STATUS_ROW_ID};
use crate::error::{RefreshError, Result};
use chrono::{DateTime, Utc};
use log::{debug, error};
use std::sync::Arc;

#[derive(Clone)]
pub struct StatusRecorder {
    store: Arc<dyn CacheStore>,
}

impl StatusRecorder {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Builds the row; `last_full_update` is only stamped for a complete run.
    pub fn status_row(
        status: RunStatus,
        successful: u32,
        failed: u32,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> RefreshStatus {
        RefreshStatus {
            id: STATUS_ROW_ID,
            status,
            successful_endpoints: successful,
            failed_endpoints: failed,
            error_message: message,
            last_full_update: (status == RunStatus::Complete).then_some(now),
            updated_at: now,
        }
    }

    /// Writes the status row. Failures come back as `StatusRecord` for the caller to log;
    /// they never fail a run.
    pub async fn record(
        &self,
        status: RunStatus,
        successful: u32,
        failed: u32,
        message: Option<String>,
    ) -> Result<()> {
        let row = Self::status_row(status, successful, failed, message, Utc::now());
        match self.store.upsert_status(&row).await {
            Ok(()) => {
                debug!("Status recorded: {} ({} ok / {} failed)", status, successful, failed);
                Ok(())
            }
            Err(e) => {
                error!("❌ Failed to update cache status: {}", e);
                Err(match e {
                    RefreshError::StatusRecord(_) => e,
                    other => RefreshError::StatusRecord(other.to_string()),
                })
            }
        }
    }
}
