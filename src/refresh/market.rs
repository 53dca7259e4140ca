// src/refresh/market.rs
//! Market group: price and ranking views plus the two category snapshots.

use super::cache_keys::*;
use super::views;
use super::RunContext;
use crate::api::endpoints::{
    data_array, data_or_empty, CATEGORY_CRYPTOCURRENCIES, CATEGORY_DEFI, COINS_LIST,
};
use crate::error::Result;
use crate::store::View;
use log::info;
use serde_json::Value;

pub const VIEW_COUNT: u32 = 5;

pub async fn refresh(ctx: &RunContext<'_>) -> Result<usize> {
    info!("🔄 Caching market data…");

    let (coins, crypto, defi) = tokio::try_join!(
        ctx.coins.get(),
        ctx.client.request(CATEGORY_CRYPTOCURRENCIES),
        ctx.client.request(CATEGORY_DEFI),
    )?;

    let written = ctx.writer.write_all(build_views(coins, &crypto, &defi)).await?;
    info!("✅ Market data cached");
    Ok(written)
}

pub fn build_views(coins: &Value, crypto: &Value, defi: &Value) -> Vec<View> {
    let coins = data_array(coins);
    vec![
        View::new(
            MARKET_TOP_GAINERS,
            COINS_LIST,
            Value::Array(views::top_gainers(coins)),
        ),
        View::new(
            MARKET_CRYPTO_CATEGORY,
            CATEGORY_CRYPTOCURRENCIES,
            data_or_empty(crypto),
        ),
        View::new(
            MARKET_DEFI_CATEGORY,
            CATEGORY_DEFI,
            data_or_empty(defi),
        ),
        View::new(
            MARKET_ALTRANK_CHAMPIONS,
            COINS_LIST,
            Value::Array(views::altrank_champions(coins)),
        ),
        View::new(
            MARKET_SENTIMENT_LEADERS,
            COINS_LIST,
            Value::Array(views::sentiment_leaders(coins)),
        ),
    ]
}
