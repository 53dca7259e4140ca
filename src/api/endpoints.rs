//! LunarCrush endpoint paths and response helpers.

use serde_json::Value;

pub const COINS_LIST: &str = "/coins/list/v1";
pub const CATEGORY_CREATORS: &str = "/category/cryptocurrencies/creators/v1";
pub const CATEGORIES_LIST: &str = "/categories/list/v1";
pub const CATEGORY_CRYPTOCURRENCIES: &str = "/category/cryptocurrencies/v1";
pub const CATEGORY_DEFI: &str = "/category/defi/v1";
pub const TOPIC_BITCOIN: &str = "/topic/bitcoin/v1";
pub const TOPIC_ETHEREUM: &str = "/topic/ethereum/v1";
pub const TOPIC_SOLANA: &str = "/topic/solana/v1";
pub const CATEGORY_NEWS: &str = "/category/cryptocurrencies/news/v1";
pub const CATEGORY_POSTS: &str = "/category/cryptocurrencies/posts/v1";

/// The `data` array of a response, or empty when absent or not an array.
pub fn data_array(response: &Value) -> &[Value] {
    response
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The `data` record of a single-topic response, or null when it is absent or falsy.
pub fn data_record(response: &Value) -> Value {
    match response.get("data") {
        Some(Value::Null) | Some(Value::Bool(false)) | None => Value::Null,
        Some(Value::String(s)) if s.is_empty() => Value::Null,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Value::Null,
        Some(record) => record.clone(),
    }
}

/// The `data` payload whatever its shape, or `[]` when it is absent or falsy.
pub fn data_or_empty(response: &Value) -> Value {
    match data_record(response) {
        Value::Null => Value::Array(Vec::new()),
        data => data,
    }
}
