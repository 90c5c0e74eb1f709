//! OKX Client
//!
//! A small signed client for the OKX v5 REST API: account, position,
//! grid strategy and ticker readers, plus a backward-paginating historical
//! kline downloader that writes CSV.
//!
//! ```no_run
//! use okx_client::config::OkxConfig;
//! use okx_client::kline::KlineDownloader;
//! use okx_client::okx::OkxClient;
//! use okx_client::Bar;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = OkxClient::new(&OkxConfig::from_env()?)?;
//!     let mut downloader = KlineDownloader::new(client);
//!     let candles = downloader.download(
//!         "SOL",
//!         Bar::M15,
//!         "2025-09-01",
//!         "2025-09-30",
//!         Some(Path::new("data/sol_15m.csv")),
//!     )?;
//!     println!("Fetched {} candles", candles.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod kline;
pub mod okx;
pub mod types;

pub use config::OkxConfig;
pub use kline::{KlineDownloader, KlineError, PageRequest, PageResult, PageSource};
pub use okx::OkxClient;
pub use types::*;
