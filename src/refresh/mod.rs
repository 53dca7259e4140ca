// src/refresh/mod.rs
//! Refresh pipeline: group refreshers that fan out upstream calls, derive views and cache
//! them, plus the orchestrator that runs the groups and finalizes the status row.

pub mod latest;
pub mod market;
pub mod orchestrator;
pub mod trends;
pub mod views;

pub use orchestrator::{run_refresh, RefreshOrchestrator, RunSummary};

use crate::api::{CoinsSnapshot, LunarCrushClient};
use crate::error::Result;
use crate::store::CacheWriter;
use std::fmt;

/// Cache keys written by the groups.
pub mod cache_keys {
    pub const TRENDS_TRENDING_COINS: &str = "trends_trending_coins";
    pub const TRENDS_TOP_CREATORS: &str = "trends_top_creators";
    pub const TRENDS_HOT_SECTORS: &str = "trends_hot_sectors";
    pub const TRENDS_GALAXY_LEADERS: &str = "trends_galaxy_leaders";

    pub const MARKET_TOP_GAINERS: &str = "market_top_gainers";
    pub const MARKET_CRYPTO_CATEGORY: &str = "market_crypto_category";
    pub const MARKET_DEFI_CATEGORY: &str = "market_defi_category";
    pub const MARKET_ALTRANK_CHAMPIONS: &str = "market_altrank_champions";
    pub const MARKET_SENTIMENT_LEADERS: &str = "market_sentiment_leaders";

    pub const LATEST_BITCOIN: &str = "latest_bitcoin";
    pub const LATEST_ETHEREUM: &str = "latest_ethereum";
    pub const LATEST_SOLANA: &str = "latest_solana";
    pub const LATEST_CRYPTO_NEWS: &str = "latest_crypto_news";
    pub const LATEST_CRYPTO_POSTS: &str = "latest_crypto_posts";
}

/// Everything a group needs for one run. Built fresh per run, so the coin snapshot never
/// outlives it.
pub struct RunContext<'a> {
    pub client: &'a LunarCrushClient,
    pub coins: CoinsSnapshot<'a>,
    pub writer: &'a CacheWriter,
}

impl<'a> RunContext<'a> {
    pub fn new(client: &'a LunarCrushClient, writer: &'a CacheWriter) -> Self {
        Self {
            client,
            coins: CoinsSnapshot::new(client),
            writer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshGroup {
    Trends,
    Market,
    Latest,
}

impl RefreshGroup {
    /// Run order.
    pub const ALL: [RefreshGroup; 3] = [RefreshGroup::Trends, RefreshGroup::Market, RefreshGroup::Latest];

    /// Views the group owns. Failure accounting charges the full count.
    pub fn view_count(&self) -> u32 {
        match self {
            RefreshGroup::Trends => trends::VIEW_COUNT,
            RefreshGroup::Market => market::VIEW_COUNT,
            RefreshGroup::Latest => latest::VIEW_COUNT,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshGroup::Trends => "Trends",
            RefreshGroup::Market => "Market",
            RefreshGroup::Latest => "Latest",
        }
    }

    /// Total views across all groups.
    pub fn total_view_count() -> u32 {
        Self::ALL.iter().map(RefreshGroup::view_count).sum()
    }

    /// Runs the group to completion. Returns the number of views written.
    pub async fn refresh(&self, ctx: &RunContext<'_>) -> Result<usize> {
        match self {
            RefreshGroup::Trends => trends::refresh(ctx).await,
            RefreshGroup::Market => market::refresh(ctx).await,
            RefreshGroup::Latest => latest::refresh(ctx).await,
        }
    }
}

impl fmt::Display for RefreshGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_view_counts() {
        assert_eq!(RefreshGroup::Trends.view_count(), 4);
        assert_eq!(RefreshGroup::Market.view_count(), 5);
        assert_eq!(RefreshGroup::Latest.view_count(), 5);
        assert_eq!(RefreshGroup::total_view_count(), 14);
    }
}
