// src/error/mod.rs
//! Error taxonomy for the refresh pipeline.
//!
//! Group-level failures (`Upstream`, `RateLimitExhausted`, `Timeout`, `StoreWrite`, ...) are
//! caught by the orchestrator and folded into the run's counters. `Configuration` aborts
//! before any work starts. `StatusRecord` is only ever logged.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RefreshError>;

#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// Non-2xx, non-429 upstream response
    #[error("API request failed: {status} ({endpoint})")]
    Upstream { endpoint: String, status: u16 },

    /// A single attempt came back 429; consumed by the retry combinator
    #[error("API rate limited: 429 ({endpoint})")]
    RateLimited { endpoint: String },

    /// Still 429 after the final attempt
    #[error("API request failed: 429 after {attempts} attempts ({endpoint})")]
    RateLimitExhausted { endpoint: String, attempts: u32 },

    #[error("API request timed out ({endpoint})")]
    Timeout { endpoint: String },

    /// Connection-level failures (DNS, TLS, reset, ...)
    #[error("Network Error: {0}")]
    Network(String),

    /// Response body was not valid JSON
    #[error("Parse Error: {0}")]
    Parse(String),

    /// Cache entry upsert failed
    #[error("Store Write Error: {0}")]
    StoreWrite(String),

    /// Status row upsert failed
    #[error("Status Record Error: {0}")]
    StatusRecord(String),

    /// Missing or malformed settings
    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Refresh run cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RefreshError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RefreshError::Parse(err.to_string())
        } else {
            RefreshError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RefreshError {
    fn from(err: serde_json::Error) -> Self {
        RefreshError::Parse(format!("JSON serialization/deserialization error: {}", err))
    }
}

impl From<redis::RedisError> for RefreshError {
    fn from(err: redis::RedisError) -> Self {
        RefreshError::StoreWrite(format!("Redis error: {}", err))
    }
}

impl From<url::ParseError> for RefreshError {
    fn from(err: url::ParseError) -> Self {
        RefreshError::Configuration(format!("invalid URL: {}", err))
    }
}

impl RefreshError {
    /// Only a single rate-limited attempt is worth another try. Timeouts and every other
    /// upstream status fail the group straight away.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RefreshError::RateLimited { .. })
    }

    /// Categorizes error for log grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            RefreshError::Upstream { .. }
            | RefreshError::RateLimited { .. }
            | RefreshError::RateLimitExhausted { .. }
            | RefreshError::Timeout { .. }
            | RefreshError::Network(_)
            | RefreshError::Parse(_) => ErrorCategory::Upstream,
            RefreshError::StoreWrite(_) | RefreshError::StatusRecord(_) => ErrorCategory::Storage,
            RefreshError::Configuration(_) => ErrorCategory::Configuration,
            RefreshError::Cancelled => ErrorCategory::Lifecycle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Storage,
    Configuration,
    Lifecycle,
}
