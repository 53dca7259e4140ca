// src/api/client.rs
//! HTTP client for the LunarCrush public API.

use super::backoff::{retry_rate_limited, BackoffSchedule};
use super::rate_limiter::RequestSpacer;
use crate::config::Config;
use crate::error::{RefreshError, Result};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

const USER_AGENT: &str = concat!("crypto-cache-refresher/", env!("CARGO_PKG_VERSION"));

/// Upstream client. One instance per refresh run; nothing here is shared across runs.
pub struct LunarCrushClient {
    client: Client,
    base_url: String,
    api_key: String,
    backoff: BackoffSchedule,
    spacer: RequestSpacer,
}

impl LunarCrushClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_policy(
            &config.lunarcrush_base_url,
            &config.lunarcrush_api_key,
            config.request_timeout(),
            BackoffSchedule::new(config.rate_limit_base_delay(), config.rate_limit_max_attempts),
            config.min_request_spacing(),
        )
    }

    pub fn with_policy(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        backoff: BackoffSchedule,
        min_spacing: Duration,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(RefreshError::Configuration(
                "LunarCrush API key is empty".to_string(),
            ));
        }
        // Fail construction on a bad base URL rather than on the first request
        Url::parse(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| RefreshError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            backoff,
            spacer: RequestSpacer::new(min_spacing),
        })
    }

    /// Base URL + endpoint, then `key`, then every param that has a value.
    pub fn build_url(&self, endpoint: &str, params: &[(&str, Option<&str>)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.api_key);
            for (name, value) in params {
                if let Some(value) = value {
                    query.append_pair(name, value);
                }
            }
        }
        Ok(url)
    }

    pub async fn request(&self, endpoint: &str) -> Result<Value> {
        self.request_with(endpoint, &[]).await
    }

    /// GET `endpoint` with 429 backoff. Any other non-2xx fails immediately.
    pub async fn request_with(
        &self,
        endpoint: &str,
        params: &[(&str, Option<&str>)],
    ) -> Result<Value> {
        let url = self.build_url(endpoint, params)?;
        retry_rate_limited(&self.backoff, endpoint, |_| self.send_once(&url, endpoint)).await
    }

    async fn send_once(&self, url: &Url, endpoint: &str) -> Result<Value> {
        self.spacer.wait_turn(endpoint).await;

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_send_error(e, endpoint))?;

        let status = response.status();
        debug!("GET {} -> {} in {} ms", endpoint, status, start.elapsed().as_millis());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RefreshError::RateLimited {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            warn!("❌ {} returned HTTP {}", endpoint, status.as_u16());
            return Err(RefreshError::Upstream {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            // the URL carries the API key
            let e = e.without_url();
            if e.is_timeout() {
                RefreshError::Timeout {
                    endpoint: endpoint.to_string(),
                }
            } else {
                RefreshError::Parse(format!("{}: {}", endpoint, e))
            }
        })
    }
}

fn classify_send_error(err: reqwest::Error, endpoint: &str) -> RefreshError {
    let err = err.without_url();
    if err.is_timeout() {
        RefreshError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        RefreshError::Network(format!("{}: {}", endpoint, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LunarCrushClient {
        LunarCrushClient::with_policy(
            "https://lunarcrush.com/api4/public/",
            "secret",
            Duration::from_secs(5),
            BackoffSchedule::default(),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_url_has_key_and_only_present_params() {
        let url = client()
            .build_url(
                "/coins/list/v1",
                &[("sort", Some("galaxy_score")), ("limit", None)],
            )
            .unwrap();

        assert_eq!(url.path(), "/api4/public/coins/list/v1");
        assert_eq!(url.query(), Some("key=secret&sort=galaxy_score"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = LunarCrushClient::with_policy(
            "https://lunarcrush.com/api4/public",
            "",
            Duration::from_secs(5),
            BackoffSchedule::default(),
            Duration::ZERO,
        );
        assert!(matches!(result, Err(RefreshError::Configuration(_))));
    }
}
