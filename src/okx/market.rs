//! Market data readers
//!
//! History candles are paged by [`crate::kline::KlineDownloader`]; this
//! module only covers the single-shot ticker.

use serde_json::json;

use super::client::OkxClient;
use super::error::{OkxError, OkxResult};
use super::types::Ticker;
use super::TICKER;

impl OkxClient {
    /// Latest ticker for one instrument, e.g. `SOL-USDT`
    pub fn get_ticker(&self, inst_id: &str) -> OkxResult<Ticker> {
        let params = json!({ "instId": inst_id });
        let tickers: Vec<Ticker> = self.get(TICKER, Some(&params))?;
        tickers
            .into_iter()
            .next()
            .ok_or_else(|| OkxError::NotFound(format!("ticker for {}", inst_id)))
    }
}
