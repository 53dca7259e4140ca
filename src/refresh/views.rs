// src/refresh/views.rs
//! Pure derivations from upstream payloads to cached views.
//!
//! Upstream records are kept as opaque JSON; only the fields a view filters or sorts on are
//! inspected. Absent or non-numeric sort keys rank as 0 (descending views) or
//! `MISSING_ALT_RANK` (alt-rank). All sorts are stable.

use serde_json::{Map, Value};
use std::cmp::Ordering;

pub const TOP_COINS_LIMIT: usize = 10;
pub const TOP_CREATORS_LIMIT: usize = 10;
pub const HOT_SECTORS_LIMIT: usize = 8;
pub const NEWS_LIMIT: usize = 15;
pub const POSTS_LIMIT: usize = 10;
pub const GALAXY_SCORE_FLOOR: f64 = 60.0;
pub const MISSING_ALT_RANK: f64 = 999_999.0;

/// Creator names (lowercase) of exchanges and mainstream media, kept out of the creators view.
pub const CREATOR_BLACKLIST: &[&str] = &[
    "mexc",
    "etoro",
    "power slap",
    "powerslap",
    "krsna",
    "coinex",
    "kucoin",
    "luno",
    "binance",
    "coinbase",
    "kraken",
    "espn",
    "fox news",
    "cnn",
    "nbc",
    "abc",
    "cbs",
    "okx",
    "bybit",
    "gate.io",
    "huobi",
    "bitgetglobal",
    "cryptocom",
    "bitget",
    "crypto.com",
    "bitcoinmagazine",
    "fantompro1",
    "cointelegraph",
];

/// Fields kept on every news article / social post.
pub const POST_FIELDS: &[&str] = &[
    "id",
    "post_type",
    "post_title",
    "post_link",
    "post_image",
    "post_created",
    "post_sentiment",
    "creator_id",
    "creator_name",
    "creator_display_name",
    "creator_followers",
    "creator_avatar",
    "interactions_24h",
    "interactions_total",
];

fn number(record: &Value, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

/// JavaScript-style truthiness, which is what the upstream consumers filter on.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn asc(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Keep records whose `field` is a number above `floor` (or at least `floor` when
/// `inclusive`), highest first.
fn ranked_desc(records: &[Value], field: &str, floor: f64, inclusive: bool, limit: usize) -> Vec<Value> {
    let mut kept: Vec<&Value> = records
        .iter()
        .filter(|r| match number(r, field) {
            Some(v) if inclusive => v >= floor,
            Some(v) => v > floor,
            None => false,
        })
        .collect();
    kept.sort_by(|a, b| desc(number(a, field).unwrap_or(0.0), number(b, field).unwrap_or(0.0)));
    kept.into_iter().take(limit).cloned().collect()
}

pub fn trending_coins(coins: &[Value]) -> Vec<Value> {
    ranked_desc(coins, "interactions_24h", 0.0, false, TOP_COINS_LIMIT)
}

pub fn galaxy_leaders(coins: &[Value]) -> Vec<Value> {
    ranked_desc(coins, "galaxy_score", GALAXY_SCORE_FLOOR, true, TOP_COINS_LIMIT)
}

pub fn top_gainers(coins: &[Value]) -> Vec<Value> {
    ranked_desc(coins, "percent_change_24h", 0.0, false, TOP_COINS_LIMIT)
}

/// Truthy `alt_rank`, best (lowest) rank first.
pub fn altrank_champions(coins: &[Value]) -> Vec<Value> {
    let rank = |r: &Value| number(r, "alt_rank").unwrap_or(MISSING_ALT_RANK);
    let mut kept: Vec<&Value> = coins
        .iter()
        .filter(|c| is_truthy(c.get("alt_rank")))
        .collect();
    kept.sort_by(|a, b| asc(rank(a), rank(b)));
    kept.into_iter().take(TOP_COINS_LIMIT).cloned().collect()
}

/// Truthy `sentiment`, highest first.
pub fn sentiment_leaders(coins: &[Value]) -> Vec<Value> {
    let score = |r: &Value| number(r, "sentiment").unwrap_or(0.0);
    let mut kept: Vec<&Value> = coins
        .iter()
        .filter(|c| is_truthy(c.get("sentiment")))
        .collect();
    kept.sort_by(|a, b| desc(score(a), score(b)));
    kept.into_iter().take(TOP_COINS_LIMIT).cloned().collect()
}

pub fn is_blacklisted_creator(creator: &Value) -> bool {
    match creator.get("creator_name").and_then(Value::as_str) {
        Some(name) => {
            let name = name.to_lowercase();
            CREATOR_BLACKLIST.iter().any(|blocked| name.contains(blocked))
        }
        None => false,
    }
}

pub fn top_creators(creators: &[Value]) -> Vec<Value> {
    creators
        .iter()
        .filter(|c| !is_blacklisted_creator(c))
        .take(TOP_CREATORS_LIMIT)
        .cloned()
        .collect()
}

pub fn hot_sectors(categories: &[Value]) -> Vec<Value> {
    categories.iter().take(HOT_SECTORS_LIMIT).cloned().collect()
}

/// Copies only the `POST_FIELDS` a record actually has.
pub fn project_post(post: &Value) -> Value {
    let mut projected = Map::new();
    if let Some(fields) = post.as_object() {
        for field in POST_FIELDS {
            if let Some(value) = fields.get(*field) {
                projected.insert((*field).to_string(), value.clone());
            }
        }
    }
    Value::Object(projected)
}

pub fn crypto_news(articles: &[Value]) -> Vec<Value> {
    articles.iter().take(NEWS_LIMIT).map(project_post).collect()
}

pub fn crypto_posts(posts: &[Value]) -> Vec<Value> {
    posts.iter().take(POSTS_LIMIT).map(project_post).collect()
}
