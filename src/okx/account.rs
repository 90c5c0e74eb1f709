//! Account, position and grid strategy readers
//!
//! Each reader is one signed GET. The `format_*` helpers turn the typed
//! results into the human-readable summaries the CLI prints.

use rust_decimal::Decimal;

use super::client::OkxClient;
use super::error::OkxResult;
use super::types::{AccountBalance, BalanceDetail, GridStrategy, Position};
use super::{ACCOUNT_BALANCE, GRID_ORDER_ALGO, POSITIONS};

/// Strategy type the grid listing filters on by default
pub const CONTRACT_GRID: &str = "contract_grid";

impl OkxClient {
    /// Per-currency balance details of the trading account
    pub fn get_balance(&self) -> OkxResult<Vec<BalanceDetail>> {
        let accounts: Vec<AccountBalance> = self.get(ACCOUNT_BALANCE, None)?;
        Ok(accounts
            .into_iter()
            .next()
            .map(|a| a.details)
            .unwrap_or_default())
    }

    /// Open positions
    pub fn get_positions(&self) -> OkxResult<Vec<Position>> {
        self.get(POSITIONS, None)
    }

    /// All grid strategies, unfiltered
    pub fn get_grid_strategies(&self) -> OkxResult<Vec<GridStrategy>> {
        self.get(GRID_ORDER_ALGO, None)
    }
}

/// Keep strategies whose `strategyType` equals `strategy_type`
pub fn filter_strategies(strategies: Vec<GridStrategy>, strategy_type: &str) -> Vec<GridStrategy> {
    strategies
        .into_iter()
        .filter(|s| s.strategy_type == strategy_type)
        .collect()
}

/// Summarize balances with a positive available amount
pub fn format_balances(details: &[BalanceDetail]) -> String {
    let held: Vec<&BalanceDetail> = details
        .iter()
        .filter(|d| d.avail_decimal() > Decimal::ZERO)
        .collect();

    if held.is_empty() {
        return "No balances with available amount > 0".to_string();
    }

    let mut out = String::from("Account balances (available > 0):\n");
    for d in held {
        out.push_str(&format!(
            "  {}: {} ≈ ${} USD\n",
            d.ccy,
            fixed(d.avail_decimal(), 8),
            fixed(d.eq_usd_decimal(), 2)
        ));
    }
    out
}

/// Round and pad to exactly `dp` decimal places
fn fixed(mut value: Decimal, dp: u32) -> Decimal {
    value.rescale(dp);
    value
}

pub fn format_positions(positions: &[Position]) -> String {
    if positions.is_empty() {
        return "No open positions".to_string();
    }

    let mut out = String::from("Open positions:\n");
    for p in positions {
        out.push_str(&format!(
            "  {} | side: {} | size: {} | avg price: {} | unrealized PnL: {}\n",
            p.inst_id, p.pos_side, p.pos, p.avg_px, p.upl
        ));
    }
    out
}

pub fn format_grid_strategies(strategies: &[GridStrategy], strategy_type: &str) -> String {
    if strategies.is_empty() {
        return format!("No {} strategies", strategy_type);
    }

    let mut out = format!("Active {} strategies:\n", strategy_type);
    for s in strategies {
        out.push_str(&format!(
            "  algo {} | {} | state: {} | invested: {} | PnL: {}\n",
            s.algo_id,
            s.inst_id,
            s.state,
            s.total_investment().unwrap_or("N/A"),
            s.pnl
        ));
    }
    out
}
