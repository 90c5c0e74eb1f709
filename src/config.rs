//! Configuration management
//!
//! Handles loading the client configuration from a JSON file and/or the
//! environment (including a `.env` file) for API credentials.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::okx::auth::Credentials;
use crate::okx::API_BASE_URL;

/// Client configuration, passed explicitly into [`crate::okx::OkxClient::new`]
#[derive(Clone, Serialize, Deserialize)]
pub struct OkxConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub passphrase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_proxy: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Log method, URL, status and body of every response at info level
    #[serde(default)]
    pub debug: bool,
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for OkxConfig {
    fn default() -> Self {
        OkxConfig {
            base_url: default_base_url(),
            api_key: String::new(),
            secret_key: String::new(),
            passphrase: String::new(),
            http_proxy: None,
            https_proxy: None,
            timeout_secs: default_timeout_secs(),
            debug: false,
        }
    }
}

impl std::fmt::Debug for OkxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkxConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret_key", &"***")
            .field("passphrase", &"***")
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .field("timeout_secs", &self.timeout_secs)
            .field("debug", &self.debug)
            .finish()
    }
}

impl OkxConfig {
    /// Load configuration from the environment
    ///
    /// Reads `.env` first if present, then `OKX_BASE_URL`, `OKX_API_KEY`,
    /// `OKX_SECRET_KEY`, `OKX_PASSPHRASE`, `OKX_HTTP_PROXY`, `OKX_HTTPS_PROXY`,
    /// `OKX_TIMEOUT_SECS` and `OKX_DEBUG`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = OkxConfig::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from JSON file, then let the environment override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        let contents = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file {}", path.as_ref().display())
        })?;
        let mut config: OkxConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values found through `lookup` onto this config
    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OKX_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("OKX_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("OKX_SECRET_KEY") {
            self.secret_key = v;
        }
        if let Some(v) = lookup("OKX_PASSPHRASE") {
            self.passphrase = v;
        }
        if let Some(v) = lookup("OKX_HTTP_PROXY") {
            self.http_proxy = Some(v);
        }
        if let Some(v) = lookup("OKX_HTTPS_PROXY") {
            self.https_proxy = Some(v);
        }
        if let Some(v) = lookup("OKX_TIMEOUT_SECS") {
            self.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("OKX_TIMEOUT_SECS is not a number: {}", v))?;
        }
        if let Some(v) = lookup("OKX_DEBUG") {
            self.debug = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_key, &self.secret_key, &self.passphrase)
    }
}
