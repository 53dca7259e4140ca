//! PostgREST upserts against a mock Supabase project.

use chrono::Utc;
use crypto_cache_refresher::store::supabase::SupabaseStore;
use crypto_cache_refresher::store::{CacheStore, CacheWriter, RunStatus, StatusRecorder};
use crypto_cache_refresher::RefreshError;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const SERVICE_KEY: &str = "service-role-test";

#[tokio::test]
async fn test_cache_entry_upsert_targets_cache_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/crypto_cache")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "cache_key".into()))
        .match_header("apikey", SERVICE_KEY)
        .match_header("authorization", format!("Bearer {}", SERVICE_KEY).as_str())
        .match_header("prefer", "resolution=merge-duplicates,return=minimal")
        .match_body(Matcher::PartialJson(json!({
            "cache_key": "latest_bitcoin",
            "endpoint_url": "/topic/bitcoin/v1",
            "data": { "topic": "bitcoin" },
            "response_status": "success"
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(SupabaseStore::new(&server.url(), SERVICE_KEY).unwrap());
    let writer = CacheWriter::new(store, Duration::from_secs(10_800)).unwrap();
    writer
        .write("latest_bitcoin", "/topic/bitcoin/v1", json!({ "topic": "bitcoin" }))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_upsert_is_a_store_write_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/crypto_cache")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key"}"#)
        .create_async()
        .await;

    let store = SupabaseStore::new(&server.url(), SERVICE_KEY).unwrap();
    let writer = CacheWriter::new(Arc::new(store), Duration::from_secs(60)).unwrap();
    let err = writer
        .write("market_top_gainers", "/coins/list/v1", json!([]))
        .await
        .unwrap_err();

    match err {
        RefreshError::StoreWrite(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_partial_status_omits_last_full_update() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/crypto_cache_status")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_body(Matcher::PartialJson(json!({
            "id": 1,
            "status": "partial",
            "successful_endpoints": 9,
            "failed_endpoints": 5,
            "error_message": "Market: API request failed: 500 (/category/defi/v1)"
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(SupabaseStore::new(&server.url(), SERVICE_KEY).unwrap());
    let row = StatusRecorder::status_row(
        RunStatus::Partial,
        9,
        5,
        Some("Market: API request failed: 500 (/category/defi/v1)".into()),
        Utc::now(),
    );
    let body = serde_json::to_value(&row).unwrap();
    assert!(body.get("last_full_update").is_none());

    store.upsert_status(&row).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_failure_maps_to_status_record_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/crypto_cache_status")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let recorder = StatusRecorder::new(Arc::new(
        SupabaseStore::new(&server.url(), SERVICE_KEY).unwrap(),
    ));
    let err = recorder
        .record(RunStatus::Complete, 14, 0, None)
        .await
        .unwrap_err();

    assert!(matches!(err, RefreshError::StatusRecord(_)));
    assert_eq!(err.to_string().matches("Status Record Error").count(), 1);
}
