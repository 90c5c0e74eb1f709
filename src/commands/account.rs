//! Read-only account commands: balance, positions, grid strategies, ticker

use anyhow::{Context, Result};
use okx_client::okx::account::{
    filter_strategies, format_balances, format_grid_strategies, format_positions,
};
use tracing::info;

pub fn balance(config_path: Option<String>, verbose: bool) -> Result<()> {
    let client = super::build_client(config_path.as_deref(), verbose)?;
    let details = client.get_balance().context("Failed to fetch balance")?;
    info!("Fetched {} balance entries", details.len());
    println!("{}", format_balances(&details));
    Ok(())
}

pub fn positions(config_path: Option<String>, verbose: bool) -> Result<()> {
    let client = super::build_client(config_path.as_deref(), verbose)?;
    let positions = client.get_positions().context("Failed to fetch positions")?;
    info!("Fetched {} positions", positions.len());
    println!("{}", format_positions(&positions));
    Ok(())
}

pub fn grids(strategy_type: String, config_path: Option<String>, verbose: bool) -> Result<()> {
    let client = super::build_client(config_path.as_deref(), verbose)?;
    let all = client
        .get_grid_strategies()
        .context("Failed to fetch grid strategies")?;
    let total = all.len();
    let matching = filter_strategies(all, &strategy_type);
    info!("{} of {} strategies are {}", matching.len(), total, strategy_type);
    println!("{}", format_grid_strategies(&matching, &strategy_type));
    Ok(())
}

pub fn ticker(inst_id: String, config_path: Option<String>, verbose: bool) -> Result<()> {
    let client = super::build_client(config_path.as_deref(), verbose)?;
    let ticker = client
        .get_ticker(&inst_id)
        .with_context(|| format!("Failed to fetch ticker for {}", inst_id))?;

    println!("{}", ticker.inst_id);
    println!("  Last:     {}", ticker.last);
    println!("  Bid/Ask:  {} / {}", ticker.bid_px, ticker.ask_px);
    println!("  24h H/L:  {} / {}", ticker.high24h, ticker.low24h);
    println!("  24h Vol:  {}", ticker.vol24h);
    Ok(())
}
