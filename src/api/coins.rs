// src/api/coins.rs
//! Run-scoped snapshot of the full coin list.
//!
//! Trends and Market both derive views from `/coins/list/v1`; the snapshot makes sure the
//! heaviest endpoint is fetched once per run, even when callers race for it.

use super::client::LunarCrushClient;
use super::endpoints::COINS_LIST;
use crate::error::Result;
use log::debug;
use serde_json::Value;
use tokio::sync::OnceCell;

pub struct CoinsSnapshot<'a> {
    client: &'a LunarCrushClient,
    coins: OnceCell<Value>,
}

impl<'a> CoinsSnapshot<'a> {
    pub fn new(client: &'a LunarCrushClient) -> Self {
        Self {
            client,
            coins: OnceCell::new(),
        }
    }

    /// Fetches the coin list on first use and hands out the cached response afterwards.
    /// A failed fetch is not cached, so a later caller in the same run tries again.
    pub async fn get(&self) -> Result<&Value> {
        if self.coins.initialized() {
            debug!("Coin list served from run snapshot");
        }
        self.coins
            .get_or_try_init(|| self.client.request(COINS_LIST))
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.coins.initialized()
    }
}
