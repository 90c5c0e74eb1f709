//! OKX v5 REST API Integration
//!
//! - [`auth`]: request signing and credentials
//! - [`client`]: the signed blocking HTTP client
//! - [`account`]: balance, position and grid strategy readers
//! - [`market`]: ticker and history-candle readers
//! - [`types`]: response models

pub mod account;
pub mod auth;
pub mod client;
pub mod error;
pub mod market;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{sign_request, Credentials};
pub use client::{HttpMethod, OkxClient};
pub use error::{OkxError, OkxResult};
pub use types::*;

pub const API_BASE_URL: &str = "https://www.okx.com";

// Account
pub const ACCOUNT_BALANCE: &str = "/api/v5/account/balance";
pub const POSITIONS: &str = "/api/v5/account/positions";

// Market data
pub const HISTORY_CANDLES: &str = "/api/v5/market/history-candles";
pub const TICKER: &str = "/api/v5/market/ticker";

// Trading bots
pub const GRID_ORDER_ALGO: &str = "/api/v5/tradingBot/grid/order-algo";

/// Build an instrument id such as `SOL-USDT`
pub fn inst_id(symbol: &str, quote: &str) -> String {
    format!(
        "{}-{}",
        symbol.trim().to_uppercase(),
        quote.trim().to_uppercase()
    )
}
