//! Types and models for the OKX v5 REST API
//!
//! OKX sends every number as a string; they are kept as strings here and
//! parsed into `Decimal` only where arithmetic or formatting needs it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{OkxError, OkxResult};

/// Standard `{code, msg, data}` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> OkxResponse<T> {
    /// Check if response is successful
    pub fn is_ok(&self) -> bool {
        self.code == "0"
    }

    /// Extract data from a successful response
    pub fn into_result(self) -> OkxResult<T> {
        if !self.is_ok() {
            return Err(OkxError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        self.data.ok_or_else(|| OkxError::Api {
            code: self.code,
            msg: "missing data in response".to_string(),
        })
    }
}

/// One entry of `GET /api/v5/account/balance`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    #[serde(default)]
    pub total_eq: String,
    #[serde(default)]
    pub u_time: String,
    #[serde(default)]
    pub details: Vec<BalanceDetail>,
}

/// Per-currency balance detail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDetail {
    pub ccy: String,
    #[serde(default)]
    pub avail_bal: String,
    #[serde(default)]
    pub eq_usd: String,
    #[serde(default)]
    pub cash_bal: String,
    #[serde(default)]
    pub frozen_bal: String,
}

impl BalanceDetail {
    /// Available balance, zero when blank or malformed
    pub fn avail_decimal(&self) -> Decimal {
        parse_decimal_or_zero(&self.avail_bal)
    }

    /// USD equity, zero when blank or malformed
    pub fn eq_usd_decimal(&self) -> Decimal {
        parse_decimal_or_zero(&self.eq_usd)
    }
}

/// One open position from `GET /api/v5/account/positions`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub inst_id: String,
    #[serde(default)]
    pub inst_type: String,
    #[serde(default)]
    pub pos_side: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub avg_px: String,
    #[serde(default)]
    pub upl: String,
    #[serde(default)]
    pub lever: String,
    #[serde(default)]
    pub mgn_mode: String,
}

/// Investment block of a grid strategy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentData {
    #[serde(default)]
    pub total_investment: Option<String>,
}

/// Grid strategy from `GET /api/v5/tradingBot/grid/order-algo`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStrategy {
    pub algo_id: String,
    #[serde(default)]
    pub inst_id: String,
    #[serde(default)]
    pub strategy_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pnl: String,
    #[serde(default)]
    pub investment_data: Option<InvestmentData>,
}

impl GridStrategy {
    /// Total investment, if the exchange reported one
    pub fn total_investment(&self) -> Option<&str> {
        self.investment_data
            .as_ref()
            .and_then(|d| d.total_investment.as_deref())
    }
}

/// Market ticker from `GET /api/v5/market/ticker`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub inst_id: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub bid_px: String,
    #[serde(default)]
    pub ask_px: String,
    #[serde(default)]
    pub open24h: String,
    #[serde(default)]
    pub high24h: String,
    #[serde(default)]
    pub low24h: String,
    #[serde(default)]
    pub vol24h: String,
    #[serde(default)]
    pub ts: String,
}

fn parse_decimal_or_zero(raw: &str) -> Decimal {
    raw.trim().parse().unwrap_or(Decimal::ZERO)
}
