// src/refresh/trends.rs
//! Trends group: social momentum views built from the coin list, creators and categories.

use super::cache_keys::*;
use super::views;
use super::RunContext;
use crate::api::endpoints::{data_array, CATEGORIES_LIST, CATEGORY_CREATORS, COINS_LIST};
use crate::error::Result;
use crate::store::View;
use log::info;
use serde_json::Value;

pub const VIEW_COUNT: u32 = 4;

pub async fn refresh(ctx: &RunContext<'_>) -> Result<usize> {
    info!("🔄 Caching trends data…");

    let (coins, creators, categories) = tokio::try_join!(
        ctx.coins.get(),
        ctx.client.request(CATEGORY_CREATORS),
        ctx.client.request(CATEGORIES_LIST),
    )?;

    let written = ctx.writer.write_all(build_views(coins, &creators, &categories)).await?;
    info!("✅ Trends data cached");
    Ok(written)
}

pub fn build_views(coins: &Value, creators: &Value, categories: &Value) -> Vec<View> {
    let coins = data_array(coins);
    vec![
        View::new(
            TRENDS_TRENDING_COINS,
            COINS_LIST,
            Value::Array(views::trending_coins(coins)),
        ),
        View::new(
            TRENDS_TOP_CREATORS,
            CATEGORY_CREATORS,
            Value::Array(views::top_creators(data_array(creators))),
        ),
        View::new(
            TRENDS_HOT_SECTORS,
            CATEGORIES_LIST,
            Value::Array(views::hot_sectors(data_array(categories))),
        ),
        View::new(
            TRENDS_GALAXY_LEADERS,
            COINS_LIST,
            Value::Array(views::galaxy_leaders(coins)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_every_trends_view() {
        let coins = json!({ "data": [
            { "symbol": "BTC", "interactions_24h": 900, "galaxy_score": 71 },
            { "symbol": "DUST", "interactions_24h": 0, "galaxy_score": 12 }
        ]});
        let creators = json!({ "data": [
            { "creator_name": "KuCoin Updates" },
            { "creator_name": "onchain_analyst" }
        ]});

        let built = build_views(&coins, &creators, &json!({}));

        assert_eq!(built.len() as u32, VIEW_COUNT);
        assert_eq!(built[0].cache_key, TRENDS_TRENDING_COINS);
        assert_eq!(built[0].data, json!([{ "symbol": "BTC", "interactions_24h": 900, "galaxy_score": 71 }]));
        assert_eq!(built[1].data, json!([{ "creator_name": "onchain_analyst" }]));
        assert_eq!(built[2].data, json!([]));
        assert_eq!(built[3].data.as_array().map(Vec::len), Some(1));
    }
}
