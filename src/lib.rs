pub mod api; // LunarCrush client, backoff and coin snapshot
pub mod config;
pub mod error;
pub mod refresh; // Group refreshers + run orchestrator
pub mod server; // HTTP cron trigger
pub mod store; // Cache table backends
pub mod utils;

pub use config::{load_config, CacheBackend, Config};
pub use error::{RefreshError, Result};
pub use refresh::{run_refresh, RefreshOrchestrator, RunSummary};
pub use store::{CacheStore, MemoryStore, RunStatus};
