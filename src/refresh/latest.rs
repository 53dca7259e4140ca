// src/refresh/latest.rs
//! Latest group: topic snapshots for the majors plus the news and posts feeds.

use super::cache_keys::*;
use super::views;
use super::RunContext;
use crate::api::endpoints::{
    data_array, data_record, CATEGORY_NEWS, CATEGORY_POSTS, TOPIC_BITCOIN, TOPIC_ETHEREUM,
    TOPIC_SOLANA,
};
use crate::error::Result;
use crate::store::View;
use log::info;
use serde_json::Value;

pub const VIEW_COUNT: u32 = 5;

pub async fn refresh(ctx: &RunContext<'_>) -> Result<usize> {
    info!("🔄 Caching latest data…");

    let (bitcoin, ethereum, solana, news, posts) = tokio::try_join!(
        ctx.client.request(TOPIC_BITCOIN),
        ctx.client.request(TOPIC_ETHEREUM),
        ctx.client.request(TOPIC_SOLANA),
        ctx.client.request(CATEGORY_NEWS),
        ctx.client.request(CATEGORY_POSTS),
    )?;

    let latest = LatestResponses {
        bitcoin,
        ethereum,
        solana,
        news,
        posts,
    };
    let written = ctx.writer.write_all(latest.into_views()).await?;
    info!("✅ Latest data cached");
    Ok(written)
}

pub struct LatestResponses {
    pub bitcoin: Value,
    pub ethereum: Value,
    pub solana: Value,
    pub news: Value,
    pub posts: Value,
}

impl LatestResponses {
    pub fn into_views(self) -> Vec<View> {
        vec![
            View::new(LATEST_BITCOIN, TOPIC_BITCOIN, data_record(&self.bitcoin)),
            View::new(LATEST_ETHEREUM, TOPIC_ETHEREUM, data_record(&self.ethereum)),
            View::new(LATEST_SOLANA, TOPIC_SOLANA, data_record(&self.solana)),
            View::new(
                LATEST_CRYPTO_NEWS,
                CATEGORY_NEWS,
                Value::Array(views::crypto_news(data_array(&self.news))),
            ),
            View::new(
                LATEST_CRYPTO_POSTS,
                CATEGORY_POSTS,
                Value::Array(views::crypto_posts(data_array(&self.posts))),
            ),
        ]
    }
}
