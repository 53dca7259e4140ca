// src/refresh/orchestrator.rs
//! Run orchestrator: `updating` → Trends → Market → Latest → `complete` | `partial` | `error`.
//!
//! Groups run one after another and are isolated from each other: a failed group is charged
//! its full view count and the run moves on. Only failures outside the groups (client or
//! writer construction, cancellation) end the run early.

use super::{RefreshGroup, RunContext};
use crate::api::LunarCrushClient;
use crate::config::Config;
use crate::error::{RefreshError, Result};
use crate::store::{CacheStore, CacheWriter, RunStatus, StatusRecorder};
use crate::utils::log_timed;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CANCELLED_MESSAGE: &str = "run cancelled";

/// Outcome of a run that reached finalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub status: RunStatus,
    pub successful_endpoints: u32,
    pub failed_endpoints: u32,
    pub errors: Vec<String>,
}

impl RunSummary {
    /// Group errors joined with `"; "`, or `None` for a clean run.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }
}

#[derive(Debug, Default)]
struct RunTally {
    successful: u32,
    failed: u32,
    errors: Vec<String>,
}

impl RunTally {
    fn succeeded(&mut self, group: RefreshGroup) {
        self.successful += group.view_count();
    }

    fn failed(&mut self, group: RefreshGroup, err: &RefreshError) {
        self.failed += group.view_count();
        self.errors.push(format!("{}: {}", group.label(), err));
    }

    fn finish(self) -> RunSummary {
        let status = if self.failed == 0 {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        };
        RunSummary {
            status,
            successful_endpoints: self.successful,
            failed_endpoints: self.failed,
            errors: self.errors,
        }
    }
}

pub struct RefreshOrchestrator {
    config: Arc<Config>,
    store: Arc<dyn CacheStore>,
    recorder: StatusRecorder,
    cancel: CancellationToken,
}

impl RefreshOrchestrator {
    pub fn new(config: Arc<Config>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            config,
            recorder: StatusRecorder::new(store.clone()),
            store,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs one full refresh.
    ///
    /// Group failures never surface here; they end up in the summary (`partial`). `Err` means
    /// the run could not do its work at all, and the status row has already been set to
    /// `error`.
    pub async fn run(&self) -> Result<RunSummary> {
        info!(
            "🚀 Starting crypto data cache update ({} backend)…",
            self.store.backend_name()
        );
        self.record(RunStatus::Updating, 0, 0, None).await;

        let client = match LunarCrushClient::new(&self.config) {
            Ok(client) => client,
            Err(e) => return Err(self.abort(e).await),
        };
        let writer = match CacheWriter::new(self.store.clone(), self.config.cache_ttl()) {
            Ok(writer) => writer,
            Err(e) => return Err(self.abort(e).await),
        };
        let ctx = RunContext::new(&client, &writer);

        let mut tally = RunTally::default();
        for group in RefreshGroup::ALL {
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = log_timed(group.label(), group.refresh(&ctx)) => Some(result),
            };

            match outcome {
                Some(Ok(_)) => tally.succeeded(group),
                Some(Err(e)) => {
                    error!("❌ {} group failed [{:?}]: {}", group, e.category(), e);
                    tally.failed(group, &e);
                }
                None => {
                    warn!("🛑 Refresh cancelled during {} group", group);
                    let total = RefreshGroup::total_view_count();
                    self.record(
                        RunStatus::Error,
                        tally.successful,
                        total - tally.successful,
                        Some(CANCELLED_MESSAGE.to_string()),
                    )
                    .await;
                    return Err(RefreshError::Cancelled);
                }
            }
        }

        let summary = tally.finish();
        self.record(
            summary.status,
            summary.successful_endpoints,
            summary.failed_endpoints,
            summary.error_message(),
        )
        .await;
        info!(
            "✅ Cache update complete: {} success, {} failed",
            summary.successful_endpoints, summary.failed_endpoints
        );
        Ok(summary)
    }

    async fn abort(&self, err: RefreshError) -> RefreshError {
        error!("🔥 Critical failure [{:?}]: {}", err.category(), err);
        self.record(
            RunStatus::Error,
            0,
            RefreshGroup::total_view_count(),
            Some(err.to_string()),
        )
        .await;
        err
    }

    async fn record(&self, status: RunStatus, successful: u32, failed: u32, message: Option<String>) {
        // failures are logged by the recorder and never fail the run
        let _ = self.recorder.record(status, successful, failed, message).await;
    }
}

/// One refresh with a fresh orchestrator, client and coin snapshot.
pub async fn run_refresh(
    config: Arc<Config>,
    store: Arc<dyn CacheStore>,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    RefreshOrchestrator::new(config, store)
        .with_cancellation(cancel)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_market_failure_tallies_partial() {
        let mut tally = RunTally::default();
        tally.succeeded(RefreshGroup::Trends);
        tally.failed(
            RefreshGroup::Market,
            &RefreshError::Upstream {
                endpoint: "/category/defi/v1".into(),
                status: 500,
            },
        );
        tally.succeeded(RefreshGroup::Latest);

        let summary = tally.finish();
        assert_eq!(summary.status, RunStatus::Partial);
        assert_eq!(summary.successful_endpoints, 9);
        assert_eq!(summary.failed_endpoints, 5);
        assert_eq!(
            summary.error_message().as_deref(),
            Some("Market: API request failed: 500 (/category/defi/v1)")
        );
    }

    #[test]
    fn test_clean_run_is_complete_without_message() {
        let mut tally = RunTally::default();
        for group in RefreshGroup::ALL {
            tally.succeeded(group);
        }
        let summary = tally.finish();
        assert!(summary.is_complete());
        assert_eq!(summary.successful_endpoints, 14);
        assert_eq!(summary.error_message(), None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = RunSummary {
            status: RunStatus::Partial,
            successful_endpoints: 9,
            failed_endpoints: 5,
            errors: vec!["Market: boom".into()],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["status"], "partial");
        assert_eq!(value["successfulEndpoints"], 9);
        assert_eq!(value["failedEndpoints"], 5);
    }

    #[tokio::test]
    async fn test_client_construction_failure_records_error() {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(Config::with_credentials("", "http://127.0.0.1:9"));

        let result = RefreshOrchestrator::new(config, store.clone()).run().await;

        assert!(matches!(result, Err(RefreshError::Configuration(_))));
        let status = store.status().unwrap();
        assert_eq!(status.status, RunStatus::Error);
        assert_eq!(status.successful_endpoints, 0);
        assert_eq!(status.failed_endpoints, 14);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_group() {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(Config::with_credentials("key", "http://127.0.0.1:9"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_refresh(config, store.clone(), cancel).await;

        assert!(matches!(result, Err(RefreshError::Cancelled)));
        let status = store.status().unwrap();
        assert_eq!(status.status, RunStatus::Error);
        assert_eq!(status.failed_endpoints, 14);
        assert_eq!(status.error_message.as_deref(), Some("run cancelled"));
    }
}
