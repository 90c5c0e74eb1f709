//! Download command - page historical candles from OKX into a CSV file

use anyhow::{Context, Result};
use okx_client::data::load_csv;
use okx_client::kline::KlineDownloader;
use okx_client::Bar;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub struct DownloadArgs {
    pub symbol: String,
    pub bar: String,
    pub start: String,
    pub end: String,
    pub output: Option<String>,
    pub quote: String,
    pub trim: bool,
    pub throttle_ms: u64,
}

/// `data/{symbol}_{bar}_{start}_{end}.csv`
pub fn default_output(symbol: &str, bar: Bar, start: &str, end: &str) -> PathBuf {
    PathBuf::from("data").join(format!(
        "{}_{}_{}_{}.csv",
        symbol.trim().to_lowercase(),
        bar,
        start,
        end
    ))
}

pub fn run(args: DownloadArgs, config_path: Option<String>, verbose: bool) -> Result<()> {
    let bar: Bar = args.bar.parse()?;
    let output = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(&args.symbol, bar, &args.start, &args.end));

    let client = super::build_client(config_path.as_deref(), verbose)?;

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOADING HISTORICAL CANDLES FROM OKX");
    println!("{}", "=".repeat(60));
    println!("  Instrument: {}-{}", args.symbol.to_uppercase(), args.quote.to_uppercase());
    println!("  Bar:        {}", bar);
    println!("  Range:      {} .. {}", args.start, args.end);
    println!("  Output:     {}", output.display());
    println!("{}\n", "=".repeat(60));

    let mut downloader = KlineDownloader::new(client)
        .with_quote(args.quote)
        .with_throttle(Duration::from_millis(args.throttle_ms))
        .with_trim_to_range(args.trim);

    let candles = downloader
        .download(&args.symbol, bar, &args.start, &args.end, Some(&output))
        .with_context(|| format!("Download of {} {} failed", args.symbol, bar))?;

    // re-read what was written as a sanity check
    let written = load_csv(&output)?;
    info!("Verified {} rows in {}", written.len(), output.display());

    println!("\n{}", "=".repeat(60));
    println!("DOWNLOAD COMPLETE");
    println!("{}", "=".repeat(60));
    println!("  Candles:    {}", candles.len());
    if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
        let fmt = |c: &okx_client::Candle| {
            c.datetime()
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| c.ts.to_string())
        };
        println!("  First:      {}", fmt(first));
        println!("  Last:       {}", fmt(last));
    }
    println!("  Saved to:   {}", output.display());
    println!("{}", "=".repeat(60));

    Ok(())
}
