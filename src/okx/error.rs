//! OKX-specific error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OkxError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parse error (HTTP {status}): {body}")]
    Parse { status: u16, body: String },

    #[error("API error ({code}): {msg}")]
    Api { code: String, msg: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type OkxResult<T> = Result<T, OkxError>;
