//! OKX REST API client
//!
//! Blocking HTTP client that signs every call. No retry, rate limiting or
//! circuit breaker: one failure is terminal for that call and comes back
//! as an [`OkxError`].
//!
//! # Example
//!
//! ```no_run
//! use okx_client::config::OkxConfig;
//! use okx_client::okx::{HttpMethod, OkxClient};
//!
//! fn main() -> anyhow::Result<()> {
//!     let client = OkxClient::new(&OkxConfig::from_env()?)?;
//!     let params = serde_json::json!({ "instId": "SOL-USDT" });
//!     let raw = client.request(HttpMethod::Get, "/api/v5/market/ticker", Some(&params))?;
//!     println!("{}", raw);
//!     Ok(())
//! }
//! ```

use reqwest::blocking::Client;
use reqwest::{Proxy, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use super::auth::{self, Credentials};
use super::error::{OkxError, OkxResult};
use super::types::OkxResponse;
use crate::config::OkxConfig;

/// HTTP methods the client knows how to sign and send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = OkxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(OkxError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully prepared request: what gets signed is exactly what gets sent
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Endpoint plus encoded query string, as used in the signature
    pub request_path: String,
    pub body: String,
}

/// Signed OKX REST client
#[derive(Clone)]
pub struct OkxClient {
    http_client: Client,
    credentials: Credentials,
    base_url: String,
    debug: bool,
}

impl OkxClient {
    /// Create a new client from an explicit configuration
    pub fn new(config: &OkxConfig) -> OkxResult<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = &config.http_proxy {
            builder = builder.proxy(Proxy::http(proxy)?);
        }
        if let Some(proxy) = &config.https_proxy {
            builder = builder.proxy(Proxy::https(proxy)?);
        }

        Ok(Self {
            http_client: builder.build()?,
            credentials: config.credentials(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            debug: config.debug,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build URL, signed path and body for a call without sending it
    ///
    /// GET params go into the query string; POST/DELETE params are
    /// serialized once into the JSON body.
    pub fn prepare(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&Value>,
    ) -> OkxResult<PreparedRequest> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| {
                OkxError::Config(format!("invalid url {}{}: {}", self.base_url, endpoint, e))
            })?;

        let body = match (method, params) {
            (HttpMethod::Get, Some(params)) => {
                let pairs = query_pairs(params)?;
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs.iter());
                }
                String::new()
            }
            (HttpMethod::Get, None) => String::new(),
            (_, Some(params)) => serde_json::to_string(params)?,
            (_, None) => String::new(),
        };

        let request_path = match url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", endpoint, query),
            _ => endpoint.to_string(),
        };

        Ok(PreparedRequest {
            method,
            url,
            request_path,
            body,
        })
    }

    /// Execute a signed request and return the parsed JSON body
    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        params: Option<&Value>,
    ) -> OkxResult<Value> {
        let prepared = self.prepare(method, endpoint, params)?;
        let timestamp = auth::timestamp();
        let headers = self.credentials.headers(
            &timestamp,
            prepared.method.as_str(),
            &prepared.request_path,
            &prepared.body,
        );

        let mut request = self
            .http_client
            .request(prepared.method.to_reqwest(), prepared.url.clone());
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !prepared.body.is_empty() {
            request = request.body(prepared.body.clone());
        }

        let response = request.send().map_err(|e| {
            warn!("Request failed: {} {}: {}", method, prepared.url, e);
            OkxError::from(e)
        })?;
        let status = response.status();
        let text = response.text()?;

        if self.debug {
            info!("{} {}", method, prepared.url);
            info!("Response status: {}", status);
            info!("Response body: {}", text);
        }

        serde_json::from_str(&text).map_err(|_| {
            warn!("Non-JSON response from {} (HTTP {})", prepared.url, status);
            OkxError::Parse {
                status: status.as_u16(),
                body: text,
            }
        })
    }

    /// Like [`request`](Self::request), but takes the method as a string
    ///
    /// Anything other than GET, POST or DELETE fails before any I/O.
    pub fn request_str(
        &self,
        method: &str,
        endpoint: &str,
        params: Option<&Value>,
    ) -> OkxResult<Value> {
        let method: HttpMethod = method.parse()?;
        self.request(method, endpoint, params)
    }

    /// GET an endpoint and unwrap the `{code, msg, data}` envelope
    pub fn get<T: DeserializeOwned>(&self, endpoint: &str, params: Option<&Value>) -> OkxResult<T> {
        let raw = self.request(HttpMethod::Get, endpoint, params)?;
        decode_envelope(raw)
    }
}

/// Check `code == "0"` and deserialize `data` into `T`
pub fn decode_envelope<T: DeserializeOwned>(raw: Value) -> OkxResult<T> {
    let envelope: OkxResponse<Value> = serde_json::from_value(raw)?;
    let data = envelope.into_result()?;
    Ok(serde_json::from_value(data)?)
}

/// Flatten a JSON object into query pairs, skipping nulls
fn query_pairs(params: &Value) -> OkxResult<Vec<(String, String)>> {
    let map = params
        .as_object()
        .ok_or_else(|| OkxError::Config("query params must be a JSON object".to_string()))?;

    Ok(map
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::okx::testing::serve_once;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn client() -> OkxClient {
        OkxClient::new(&OkxConfig::default()).unwrap()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!(matches!(
            "PUT".parse::<HttpMethod>(),
            Err(OkxError::UnsupportedMethod(m)) if m == "PUT"
        ));
    }

    #[test]
    fn test_request_str_rejects_before_io() {
        let result = client().request_str("PATCH", "/api/v5/account/balance", None);
        assert!(matches!(result, Err(OkxError::UnsupportedMethod(_))));
    }

    #[test]
    fn test_prepare_get_signs_query() {
        let params = json!({
            "instId": "SOL-USDT",
            "bar": "15m",
            "before": 1_756_684_800_000i64,
            "limit": 100,
        });
        let prepared = client()
            .prepare(HttpMethod::Get, "/api/v5/market/history-candles", Some(&params))
            .unwrap();

        assert!(prepared.body.is_empty());
        assert!(prepared
            .request_path
            .starts_with("/api/v5/market/history-candles?"));
        assert!(prepared.request_path.contains("instId=SOL-USDT"));
        assert!(prepared.request_path.contains("before=1756684800000"));
        assert!(prepared.request_path.contains("limit=100"));
        // the signed path is what goes on the wire
        assert_eq!(
            prepared.url.as_str(),
            format!("https://www.okx.com{}", prepared.request_path)
        );
    }

    #[test]
    fn test_prepare_get_without_params() {
        let prepared = client()
            .prepare(HttpMethod::Get, "/api/v5/account/balance", None)
            .unwrap();
        assert_eq!(prepared.request_path, "/api/v5/account/balance");
        assert_eq!(prepared.url.query(), None);

        let empty = json!({});
        let prepared = client()
            .prepare(HttpMethod::Get, "/api/v5/account/balance", Some(&empty))
            .unwrap();
        assert_eq!(prepared.request_path, "/api/v5/account/balance");
    }

    #[test]
    fn test_prepare_post_body_is_exact_json() {
        let params = json!({ "algoId": "123", "sz": "1" });
        let prepared = client()
            .prepare(HttpMethod::Post, "/api/v5/tradingBot/grid/amend-order-algo", Some(&params))
            .unwrap();

        assert_eq!(prepared.body, serde_json::to_string(&params).unwrap());
        assert_eq!(prepared.request_path, "/api/v5/tradingBot/grid/amend-order-algo");
        assert_eq!(prepared.url.query(), None);
    }

    #[test]
    fn test_prepare_delete_without_params_has_empty_body() {
        let prepared = client()
            .prepare(HttpMethod::Delete, "/api/v5/some/resource", None)
            .unwrap();
        assert!(prepared.body.is_empty());
    }

    #[test]
    fn test_prepare_rejects_non_object_query() {
        let params = json!(["instId", "SOL-USDT"]);
        let result = client().prepare(HttpMethod::Get, "/api/v5/market/ticker", Some(&params));
        assert!(matches!(result, Err(OkxError::Config(_))));
    }

    #[test]
    fn test_query_pairs_skip_null() {
        let pairs = query_pairs(&json!({ "a": "x", "b": 5, "c": null })).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("a".to_string(), "x".to_string())));
        assert!(pairs.contains(&("b".to_string(), "5".to_string())));
    }

    #[test]
    fn test_decode_envelope() {
        let ok: Vec<String> =
            decode_envelope(json!({ "code": "0", "msg": "", "data": ["a", "b"] })).unwrap();
        assert_eq!(ok, vec!["a", "b"]);

        let err = decode_envelope::<Vec<String>>(
            json!({ "code": "51001", "msg": "Instrument ID does not exist", "data": [{"x": 1}] }),
        );
        assert!(matches!(err, Err(OkxError::Api { code, .. }) if code == "51001"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = OkxConfig::default().with_base_url("https://www.okx.com/");
        let client = OkxClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://www.okx.com");
    }

    // =========================================================================
    // Wire path against a loopback server
    // =========================================================================

    const OK_EMPTY: &str = r#"{"code":"0","msg":"","data":[]}"#;

    fn signed_client(base_url: &str) -> OkxClient {
        let config = OkxConfig {
            api_key: "test_key".to_string(),
            secret_key: "test_secret".to_string(),
            passphrase: "test_pass".to_string(),
            timeout_secs: 5,
            ..OkxConfig::default()
        }
        .with_base_url(base_url);
        OkxClient::new(&config).unwrap()
    }

    #[test]
    fn test_get_sends_signed_query_and_headers() {
        let (base_url, server) = serve_once("200 OK", OK_EMPTY);
        let params = json!({ "instId": "SOL-USDT" });

        let raw = signed_client(&base_url)
            .request(HttpMethod::Get, "/api/v5/market/ticker", Some(&params))
            .unwrap();
        let sent = server.join().unwrap();

        assert_eq!(raw["code"], "0");
        assert_eq!(
            sent.request_line,
            "GET /api/v5/market/ticker?instId=SOL-USDT HTTP/1.1"
        );
        assert_eq!(sent.header("OK-ACCESS-KEY"), Some("test_key"));
        assert_eq!(sent.header("OK-ACCESS-PASSPHRASE"), Some("test_pass"));
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert!(sent.body.is_empty());

        // the signature covers exactly the path and query that went out
        let ts = sent.header("OK-ACCESS-TIMESTAMP").unwrap();
        assert!(ts.ends_with('Z'));
        let expected = auth::sign_request(
            ts,
            "GET",
            "/api/v5/market/ticker?instId=SOL-USDT",
            "",
            "test_secret",
        );
        assert_eq!(sent.header("OK-ACCESS-SIGN"), Some(expected.as_str()));
    }

    #[test]
    fn test_post_sends_signed_body_verbatim() {
        let (base_url, server) = serve_once("200 OK", OK_EMPTY);
        let params = json!({ "algoId": "123", "sz": "1.50" });
        let endpoint = "/api/v5/tradingBot/grid/amend-order-algo";

        signed_client(&base_url)
            .request(HttpMethod::Post, endpoint, Some(&params))
            .unwrap();
        let sent = server.join().unwrap();

        let body = serde_json::to_string(&params).unwrap();
        assert_eq!(sent.request_line, format!("POST {} HTTP/1.1", endpoint));
        assert_eq!(sent.body, body);

        let ts = sent.header("OK-ACCESS-TIMESTAMP").unwrap();
        let expected = auth::sign_request(ts, "POST", endpoint, &body, "test_secret");
        assert_eq!(sent.header("OK-ACCESS-SIGN"), Some(expected.as_str()));
    }

    #[test]
    fn test_non_json_reply_is_parse_error() {
        let (base_url, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>");

        let result =
            signed_client(&base_url).request(HttpMethod::Get, "/api/v5/account/balance", None);
        server.join().unwrap();

        match result {
            Err(OkxError::Parse { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_get_unwraps_api_error_from_wire() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"code":"50111","msg":"Invalid OK-ACCESS-KEY","data":[]}"#,
        );

        let result: OkxResult<Vec<Value>> =
            signed_client(&base_url).get("/api/v5/account/balance", None);
        server.join().unwrap();

        assert!(matches!(result, Err(OkxError::Api { code, .. }) if code == "50111"));
    }

    // =========================================================================
    // Debug dumps
    // =========================================================================

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run one request under an `info` filter and return what was logged
    fn logged_at_info(debug: bool) -> String {
        let (base_url, server) = serve_once("200 OK", OK_EMPTY);
        let client = OkxClient::new(
            &OkxConfig::default()
                .with_base_url(base_url)
                .with_debug(debug),
        )
        .unwrap();

        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            client
                .request(HttpMethod::Get, "/api/v5/account/balance", None)
                .unwrap();
        });
        server.join().unwrap();

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debug_flag_dumps_visible_at_info() {
        let logs = logged_at_info(true);
        assert!(logs.contains("GET http://127.0.0.1:"));
        assert!(logs.contains("Response status: 200 OK"));
        assert!(logs.contains(&format!("Response body: {}", OK_EMPTY)));
    }

    #[test]
    fn test_no_dumps_without_debug_flag() {
        let logs = logged_at_info(false);
        assert!(!logs.contains("Response body"));
    }
}
