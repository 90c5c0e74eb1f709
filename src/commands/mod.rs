//! CLI subcommand implementations

pub mod account;
pub mod download;

use anyhow::{Context, Result};
use okx_client::config::OkxConfig;
use okx_client::okx::OkxClient;
use tracing::{debug, warn};

/// Build a client from `--config` (if given) plus the environment
pub fn build_client(config_path: Option<&str>, verbose: bool) -> Result<OkxClient> {
    let config = match config_path {
        Some(path) => OkxConfig::from_file(path)?,
        None => OkxConfig::from_env()?,
    };
    let config = if verbose { config.with_debug(true) } else { config };
    debug!("Client config: {:?}", config);

    if !config.credentials().is_complete() {
        warn!("OKX credentials are incomplete; private endpoints will be rejected");
    }

    OkxClient::new(&config).context("Failed to build OKX client")
}
