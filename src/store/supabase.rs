// src/store/supabase.rs
//! Supabase backend: upserts through the PostgREST endpoint of the project.

use super::{CacheEntry, CacheStore, RefreshStatus, CACHE_TABLE, STATUS_TABLE};
use crate::error::{RefreshError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

const STORE_TIMEOUT_SECS: u64 = 15;

#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    rest_url: Url,
}

impl fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("rest_url", &self.rest_url.as_str())
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseStore {
    pub fn new(project_url: &str, service_role_key: &str) -> Result<Self> {
        let rest_url = Url::parse(&format!("{}/rest/v1/", project_url.trim_end_matches('/')))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_role_key).map_err(|e| {
            RefreshError::Configuration(format!("service role key is not a valid header: {}", e))
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", service_role_key)).map_err(|e| {
            RefreshError::Configuration(format!("service role key is not a valid header: {}", e))
        })?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| RefreshError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, rest_url })
    }

    fn table_url(&self, table: &str, conflict_column: &str) -> Result<Url> {
        let mut url = self.rest_url.join(table)?;
        url.query_pairs_mut().append_pair("on_conflict", conflict_column);
        Ok(url)
    }

    async fn upsert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        conflict_column: &str,
        row: &T,
    ) -> Result<()> {
        let url = self.table_url(table, conflict_column)?;
        let response = self
            .client
            .post(url)
            .json(row)
            .send()
            .await
            .map_err(|e| RefreshError::StoreWrite(format!("{} upsert failed: {}", table, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("PostgREST rejected upsert into {}: HTTP {} {}", table, status, body);
            return Err(RefreshError::StoreWrite(format!(
                "{} upsert failed: HTTP {} {}",
                table,
                status.as_u16(),
                body
            )));
        }
        debug!("Upserted row into {}", table);
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SupabaseStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn upsert_entry(&self, entry: &CacheEntry) -> Result<()> {
        self.upsert(CACHE_TABLE, "cache_key", entry).await
    }

    async fn upsert_status(&self, status: &RefreshStatus) -> Result<()> {
        // `last_full_update` is skipped when absent, so PostgREST leaves the column as is
        self.upsert(STATUS_TABLE, "id", status)
            .await
            .map_err(|e| match e {
                RefreshError::StoreWrite(msg) => RefreshError::StatusRecord(msg),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_carries_conflict_target() {
        let store = SupabaseStore::new("https://project.supabase.co/", "service-key").unwrap();
        let url = store.table_url(CACHE_TABLE, "cache_key").unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/rest/v1/crypto_cache?on_conflict=cache_key"
        );
    }

    #[test]
    fn test_debug_hides_service_key() {
        let store = SupabaseStore::new("https://project.supabase.co", "service-key").unwrap();
        assert!(!format!("{:?}", store).contains("service-key"));
    }
}
