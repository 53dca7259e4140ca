//! Shared fixtures: a mockito upstream that answers every LunarCrush endpoint.
#![allow(dead_code)]

use crypto_cache_refresher::api::endpoints::*;
use crypto_cache_refresher::Config;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-key";

/// Routes library logs to the test harness (`RUST_LOG=debug cargo test` to see them).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config(base_url: &str) -> Config {
    init_logging();
    let mut config = Config::with_credentials(TEST_API_KEY, base_url);
    config.rate_limit_base_delay_ms = 1;
    config.request_timeout_secs = 5;
    config
}

pub fn coins_payload() -> Value {
    json!({ "data": [
        { "symbol": "BTC", "interactions_24h": 120000, "galaxy_score": 72, "percent_change_24h": 2.5, "alt_rank": 4, "sentiment": 81 },
        { "symbol": "ETH", "interactions_24h": 90000, "galaxy_score": 66, "percent_change_24h": -1.2, "alt_rank": 1, "sentiment": 77 },
        { "symbol": "SOL", "interactions_24h": 0, "galaxy_score": 58, "percent_change_24h": 6.1, "alt_rank": null, "sentiment": 0 }
    ]})
}

pub fn payload_for(path: &str) -> Value {
    match path {
        COINS_LIST => coins_payload(),
        CATEGORY_CREATORS => json!({ "data": [
            { "creator_name": "Binance Exchange", "creator_followers": 9000000 },
            { "creator_name": "Example DAO", "creator_followers": 1200 }
        ]}),
        CATEGORIES_LIST => json!({ "data": [{ "category": "defi" }, { "category": "memecoins" }] }),
        CATEGORY_CRYPTOCURRENCIES | CATEGORY_DEFI => json!({ "data": [{ "symbol": "UNI" }] }),
        TOPIC_BITCOIN => json!({ "data": { "topic": "bitcoin", "topic_rank": 1 } }),
        TOPIC_ETHEREUM => json!({ "data": { "topic": "ethereum", "topic_rank": 2 } }),
        TOPIC_SOLANA => json!({ "data": null }),
        CATEGORY_NEWS | CATEGORY_POSTS => json!({ "data": [
            { "id": "p1", "post_title": "Headline", "creator_name": "desk", "tracking_pixel": "x" }
        ]}),
        _ => json!({ "data": [] }),
    }
}

pub const ALL_ENDPOINTS: [&str; 10] = [
    COINS_LIST,
    CATEGORY_CREATORS,
    CATEGORIES_LIST,
    CATEGORY_CRYPTOCURRENCIES,
    CATEGORY_DEFI,
    TOPIC_BITCOIN,
    TOPIC_ETHEREUM,
    TOPIC_SOLANA,
    CATEGORY_NEWS,
    CATEGORY_POSTS,
];

pub async fn mock_ok(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::UrlEncoded("key".into(), TEST_API_KEY.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(payload_for(path).to_string())
        .create_async()
        .await
}

pub async fn mock_status(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_body(r#"{"error":"upstream"}"#)
        .create_async()
        .await
}

/// Sends headers right away, then holds the body back for `delay`.
pub async fn mock_slow(server: &mut ServerGuard, path: &str, delay: Duration) -> Mock {
    let body = payload_for(path).to_string();
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(move |w| {
            std::thread::sleep(delay);
            w.write_all(body.as_bytes())
        })
        .create_async()
        .await
}

/// Mocks every endpoint with a healthy payload except those in `failing`, which answer
/// with `status`.
pub async fn mock_upstream(server: &mut ServerGuard, failing: &[&str], status: usize) -> Vec<Mock> {
    let mut mocks = Vec::new();
    for path in ALL_ENDPOINTS {
        let mock = if failing.contains(&path) {
            mock_status(server, path, status).await
        } else {
            mock_ok(server, path).await
        };
        mocks.push(mock);
    }
    mocks
}
