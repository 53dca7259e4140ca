// src/server.rs
//! HTTP trigger for scheduled refreshes (cron hits `POST /api/cron/update-crypto-data`).

use crate::config::Config;
use crate::refresh::run_refresh;
use crate::store::CacheStore;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const REFRESH_ROUTE: &str = "/api/cron/update-crypto-data";

#[derive(Clone)]
pub struct TriggerState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CacheStore>,
    /// Cancelled on shutdown; every in-flight run gets a child token.
    pub shutdown: CancellationToken,
}

pub struct TriggerServer {
    port: u16,
    state: TriggerState,
}

impl TriggerServer {
    pub fn new(
        port: u16,
        config: Arc<Config>,
        store: Arc<dyn CacheStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let state = TriggerState {
            config,
            store,
            shutdown,
        };
        Self { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Binds `0.0.0.0:<port>` and serves until the shutdown token fires.
    pub async fn start(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", self.port)).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let shutdown = self.state.shutdown.clone();
        let app = router(self.state);

        info!("🚀 Refresh trigger listening on {}", listener.local_addr()?);
        info!("📡 Ready to run refreshes at POST {}", REFRESH_ROUTE);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Refresh trigger stopped");
        Ok(())
    }
}

pub fn router(state: TriggerState) -> Router {
    Router::new()
        .route(
            REFRESH_ROUTE,
            post(handle_refresh).fallback(method_not_allowed),
        )
        .route("/health", get(health_check))
        .with_state(state)
}

/// Runs one refresh per request. Partial runs still answer 200; only a fatal run is a 500.
async fn handle_refresh(State(state): State<TriggerState>) -> Response {
    info!("📡 Refresh triggered over HTTP");

    match run_refresh(
        state.config.clone(),
        state.store.clone(),
        state.shutdown.child_token(),
    )
    .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": summary.status,
                "successfulEndpoints": summary.successful_endpoints,
                "failedEndpoints": summary.failed_endpoints,
                "errors": summary.errors,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("🔥 Refresh run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "crypto-cache-refresher",
        "timestamp": chrono::Utc::now().timestamp()
    }))
}
