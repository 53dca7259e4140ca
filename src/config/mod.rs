// src/config/mod.rs
pub mod env;
pub mod settings;

pub use settings::{CacheBackend, Config};

use crate::error::Result;
use std::sync::Arc;

/// Loads `.env` (if present), reads the environment and validates it.
/// Fails before any network call when a required setting is missing.
pub fn load_config() -> Result<Arc<Config>> {
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let config = Config::from_env()?;
    config.log_settings();

    Ok(Arc::new(config))
}
