//! Authentication utilities for the OKX v5 API
//!
//! OKX signs every request with HMAC-SHA256 over
//! `timestamp + METHOD + requestPath + body`, Base64-encoded.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Timestamp layout OKX expects in `OK-ACCESS-TIMESTAMP`, e.g. `2020-12-08T09:08:57.715Z`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a UTC instant the way OKX expects it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time as an OKX request timestamp
pub fn timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Generate the Base64 HMAC-SHA256 signature for one request
///
/// `body` must be the exact string put on the wire (empty for GET).
///
/// # Example
///
/// ```
/// use okx_client::okx::auth::sign_request;
///
/// let sig = sign_request(
///     "2025-09-01T00:00:00.000Z",
///     "get",
///     "/api/v5/account/balance",
///     "",
///     "secret",
/// );
/// assert_eq!(sig.len(), 44);
/// ```
pub fn sign_request(
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
    secret: &str,
) -> String {
    let message = format!(
        "{}{}{}{}",
        timestamp,
        method.to_uppercase(),
        request_path,
        body
    );
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// API credentials container
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
    passphrase: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"***")
            .field("passphrase", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// True when all three values are present
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty() && !self.passphrase.is_empty()
    }

    /// Sign a request with this secret
    pub fn sign(&self, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        sign_request(timestamp, method, request_path, body, &self.secret_key)
    }

    /// Build the authentication headers for one request
    pub fn headers(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Vec<(&'static str, String)> {
        let signature = self.sign(timestamp, method, request_path, body);
        vec![
            ("OK-ACCESS-KEY", self.api_key.clone()),
            ("OK-ACCESS-SIGN", signature),
            ("OK-ACCESS-TIMESTAMP", timestamp.to_string()),
            ("OK-ACCESS-PASSPHRASE", self.passphrase.clone()),
            ("Content-Type", "application/json".to_string()),
        ]
    }
}
