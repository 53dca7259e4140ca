// src/api/mod.rs
//! Upstream access to the LunarCrush analytics API
//!
//! - `client`: GET with API key and 429 backoff
//! - `backoff`: pure delay schedule + retry combinator
//! - `rate_limiter`: optional spacing between request starts
//! - `coins`: run-scoped coin list snapshot

pub mod backoff;
pub mod client;
pub mod coins;
pub mod endpoints;
pub mod rate_limiter;

pub use backoff::{retry_rate_limited, BackoffSchedule};
pub use client::LunarCrushClient;
pub use coins::CoinsSnapshot;
pub use rate_limiter::RequestSpacer;
