// src/config/env.rs
//! Environment lookup helpers.
//!
//! Every setting may be provided under its plain name or under the `EXPO_PUBLIC_` prefix used
//! by the scheduled-job deployment. The plain name wins when both are set.

use crate::error::{RefreshError, Result};
use std::str::FromStr;

pub const API_KEY_VAR: &str = "LUNARCRUSH_API_KEY";
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const REDIS_URL_VAR: &str = "REDIS_URL";

pub const PUBLIC_PREFIX: &str = "EXPO_PUBLIC_";

/// Reads a variable through `lookup`, falling back to its prefixed alias.
/// Blank values count as unset.
pub fn lookup_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .or_else(|| lookup(&format!("{}{}", PUBLIC_PREFIX, name)))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Connection URL with its password dropped, for logs and `Debug` output.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                // only errors on cannot-be-a-base URLs, which never carry a password
                let _ = url.set_password(None);
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Collects required variables, recording every missing name so they can be reported together.
pub struct RequiredVars<'a, F> {
    lookup: &'a F,
    missing: Vec<&'static str>,
}

impl<'a, F> RequiredVars<'a, F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: &'a F) -> Self {
        Self {
            lookup,
            missing: Vec::new(),
        }
    }

    pub fn take(&mut self, name: &'static str) -> String {
        match lookup_var(self.lookup, name) {
            Some(value) => value,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            return Ok(());
        }
        Err(RefreshError::Configuration(format!(
            "missing required environment variables: {}",
            self.missing.join(", ")
        )))
    }
}

/// Parses an optional variable, using `default` when unset. A set but malformed value is an
/// error rather than a silent fallback.
pub fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup_var(lookup, name) {
        Some(raw) => raw.parse::<T>().map_err(|e| {
            RefreshError::Configuration(format!("{} has invalid value '{}': {}", name, raw, e))
        }),
        None => Ok(default),
    }
}
