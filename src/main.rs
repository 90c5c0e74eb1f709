//! OKX client - main entry point
//!
//! This binary provides five subcommands:
//! - download: Page historical candles into a CSV file
//! - balance: Show balances with a positive available amount
//! - positions: Show open positions
//! - grids: Show grid strategies of one type
//! - ticker: Show the latest ticker for an instrument

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "okx-client")]
#[command(about = "Signed OKX REST client with a historical kline downloader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional JSON config file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose output, including full API responses
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download historical candles to CSV
    Download {
        /// Base currency symbol. E.g., "BTC", "ETH", "SOL"
        #[arg(short, long, default_value = "SOL")]
        symbol: String,

        /// Bar size. E.g., "1m", "15m", "1H", "4H", "1D"
        #[arg(short, long, default_value = "15m")]
        bar: String,

        /// Start date (YYYY-MM-DD, UTC)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD, UTC)
        #[arg(long)]
        end: String,

        /// Output CSV path (default: data/{symbol}_{bar}_{start}_{end}.csv)
        #[arg(short, long)]
        output: Option<String>,

        /// Quote currency
        #[arg(long, default_value = "USDT")]
        quote: String,

        /// Drop candles older than the start date
        #[arg(long)]
        trim: bool,

        /// Pause between page requests in milliseconds
        #[arg(long, default_value = "200")]
        throttle_ms: u64,
    },

    /// Show account balances
    Balance,

    /// Show open positions
    Positions,

    /// Show grid strategies
    Grids {
        /// Strategy type to keep
        #[arg(long, default_value = "contract_grid")]
        strategy_type: String,
    },

    /// Show the latest ticker
    Ticker {
        /// Instrument id. E.g., "SOL-USDT"
        #[arg(short, long)]
        inst_id: String,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // same format, no ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Download { .. } => "download",
        Commands::Balance => "balance",
        Commands::Positions => "positions",
        Commands::Grids { .. } => "grids",
        Commands::Ticker { .. } => "ticker",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Download {
            symbol,
            bar,
            start,
            end,
            output,
            quote,
            trim,
            throttle_ms,
        } => commands::download::run(
            commands::download::DownloadArgs {
                symbol,
                bar,
                start,
                end,
                output,
                quote,
                trim,
                throttle_ms,
            },
            cli.config,
            cli.verbose,
        ),

        Commands::Balance => commands::account::balance(cli.config, cli.verbose),

        Commands::Positions => commands::account::positions(cli.config, cli.verbose),

        Commands::Grids { strategy_type } => {
            commands::account::grids(strategy_type, cli.config, cli.verbose)
        }

        Commands::Ticker { inst_id } => commands::account::ticker(inst_id, cli.config, cli.verbose),
    }
}
