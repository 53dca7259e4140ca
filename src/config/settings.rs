use super::env::{
    lookup_var, parse_or, redact_url, RequiredVars, API_KEY_VAR, REDIS_URL_VAR, SUPABASE_KEY_VAR,
    SUPABASE_URL_VAR,
};
use crate::error::{RefreshError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://lunarcrush.com/api4/public";
/// Three hours; readers treat older entries as stale.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3 * 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_RATE_LIMIT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RATE_LIMIT_BASE_DELAY_MS: u64 = 10_000;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Where cache entries and the status row are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Supabase,
    Redis,
    /// Process-local store; nothing is persisted. Useful for dry runs.
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supabase" | "postgrest" => Ok(CacheBackend::Supabase),
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Supabase => write!(f, "supabase"),
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Process-wide settings, read once at startup and handed to constructors.
#[derive(Clone)]
pub struct Config {
    pub lunarcrush_api_key: String,
    pub lunarcrush_base_url: String,
    pub cache_backend: CacheBackend,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub min_request_spacing_ms: u64,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_base_delay_ms: u64,
    pub server_port: u16,
}

// Secrets stay out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("lunarcrush_api_key", &"<redacted>")
            .field("lunarcrush_base_url", &self.lunarcrush_base_url)
            .field("cache_backend", &self.cache_backend)
            .field("supabase_url", &self.supabase_url.as_deref().map(redact_url))
            .field(
                "supabase_service_role_key",
                &self.supabase_service_role_key.as_ref().map(|_| "<redacted>"),
            )
            .field("redis_url", &self.redis_url.as_deref().map(redact_url))
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_request_spacing_ms", &self.min_request_spacing_ms)
            .field("rate_limit_max_attempts", &self.rate_limit_max_attempts)
            .field("rate_limit_base_delay_ms", &self.rate_limit_base_delay_ms)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Every missing required variable
    /// is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_backend: CacheBackend = parse_or(&lookup, "CACHE_BACKEND", CacheBackend::Supabase)?;

        let mut required = RequiredVars::new(&lookup);
        let lunarcrush_api_key = required.take(API_KEY_VAR);
        let (supabase_url, supabase_service_role_key, redis_url) = match cache_backend {
            CacheBackend::Supabase => (
                Some(required.take(SUPABASE_URL_VAR)),
                Some(required.take(SUPABASE_KEY_VAR)),
                lookup_var(&lookup, REDIS_URL_VAR),
            ),
            CacheBackend::Redis => (
                lookup_var(&lookup, SUPABASE_URL_VAR),
                lookup_var(&lookup, SUPABASE_KEY_VAR),
                Some(required.take(REDIS_URL_VAR)),
            ),
            CacheBackend::Memory => (None, None, lookup_var(&lookup, REDIS_URL_VAR)),
        };
        required.finish()?;

        let config = Config {
            lunarcrush_api_key,
            lunarcrush_base_url: lookup_var(&lookup, "LUNARCRUSH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_backend,
            supabase_url,
            supabase_service_role_key,
            redis_url,
            cache_ttl_secs: parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            request_timeout_secs: parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            min_request_spacing_ms: parse_or(&lookup, "MIN_REQUEST_SPACING_MS", 0)?,
            rate_limit_max_attempts: parse_or(
                &lookup,
                "RATE_LIMIT_MAX_ATTEMPTS",
                DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
            )?,
            rate_limit_base_delay_ms: parse_or(
                &lookup,
                "RATE_LIMIT_BASE_DELAY_MS",
                DEFAULT_RATE_LIMIT_BASE_DELAY_MS,
            )?,
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults for everything except the credentials. Used by tests and embedders that wire
    /// their own endpoints.
    pub fn with_credentials(api_key: &str, base_url: &str) -> Self {
        Config {
            lunarcrush_api_key: api_key.to_string(),
            lunarcrush_base_url: base_url.to_string(),
            cache_backend: CacheBackend::Memory,
            supabase_url: None,
            supabase_service_role_key: None,
            redis_url: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            min_request_spacing_ms: 0,
            rate_limit_max_attempts: DEFAULT_RATE_LIMIT_MAX_ATTEMPTS,
            rate_limit_base_delay_ms: DEFAULT_RATE_LIMIT_BASE_DELAY_MS,
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_max_attempts == 0 {
            return Err(RefreshError::Configuration(
                "RATE_LIMIT_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(RefreshError::Configuration(
                "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.lunarcrush_base_url)?;
        if let Some(supabase_url) = &self.supabase_url {
            url::Url::parse(supabase_url)?;
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_request_spacing(&self) -> Duration {
        Duration::from_millis(self.min_request_spacing_ms)
    }

    pub fn rate_limit_base_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_base_delay_ms)
    }

    pub fn log_settings(&self) {
        log::info!("Application Configuration Loaded: {:?}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_supabase_backend_requires_database_settings() {
        let err = config_from(&[("LUNARCRUSH_API_KEY", "key")]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("SUPABASE_URL"));
        assert!(message.contains("SUPABASE_SERVICE_ROLE_KEY"));
        assert!(!message.contains("LUNARCRUSH_API_KEY"));
    }

    #[test]
    fn test_all_missing_variables_reported_together() {
        let err = config_from(&[]).unwrap_err().to_string();
        assert!(err.contains("LUNARCRUSH_API_KEY"));
        assert!(err.contains("SUPABASE_URL"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = config_from(&[
            ("EXPO_PUBLIC_LUNARCRUSH_API_KEY", "key"),
            ("EXPO_PUBLIC_SUPABASE_URL", "https://project.supabase.co"),
            ("EXPO_PUBLIC_SUPABASE_SERVICE_ROLE_KEY", "service"),
        ])
        .unwrap();

        assert_eq!(config.cache_backend, CacheBackend::Supabase);
        assert_eq!(config.lunarcrush_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_ttl(), Duration::from_secs(10_800));
        assert_eq!(config.rate_limit_max_attempts, 3);
        assert_eq!(config.rate_limit_base_delay(), Duration::from_secs(10));
        assert_eq!(config.min_request_spacing(), Duration::ZERO);
    }

    #[test]
    fn test_redis_backend_requires_redis_url_only() {
        let err = config_from(&[("LUNARCRUSH_API_KEY", "key"), ("CACHE_BACKEND", "redis")])
            .unwrap_err()
            .to_string();
        assert!(err.contains("REDIS_URL"));
        assert!(!err.contains("SUPABASE"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = config_from(&[
            ("LUNARCRUSH_API_KEY", "key"),
            ("CACHE_BACKEND", "memory"),
            ("RATE_LIMIT_MAX_ATTEMPTS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, RefreshError::Configuration(_)));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let mut config = Config::with_credentials("super-secret", DEFAULT_BASE_URL);
        config.redis_url = Some("redis://:secret@cache.internal:6379".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("cache.internal:6379"));
    }
}
