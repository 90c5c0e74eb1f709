//! Core data types shared by the client and the kline downloader

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors turning one raw API row into a [`Candle`]
#[derive(Debug, Error, PartialEq)]
pub enum CandleParseError {
    #[error("row has {0} fields, expected at least 7")]
    TooFewFields(usize),

    #[error("field {index} is not a string: {value}")]
    NotAString { index: usize, value: String },

    #[error("timestamp is not an integer: {0}")]
    BadTimestamp(String),
}

/// OKX candlestick
///
/// Prices and volumes stay exactly as the exchange sent them so that
/// writing and re-reading never alters a digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, milliseconds since epoch
    pub ts: i64,
    pub o: String,
    pub h: String,
    pub l: String,
    pub c: String,
    /// Volume in contracts / base currency
    pub vol: String,
    /// Volume in quote currency
    #[serde(rename = "volCcy")]
    pub vol_ccy: String,
}

impl Candle {
    /// Parse one row of a candles response
    ///
    /// OKX returns `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`;
    /// only the first seven fields are kept.
    pub fn from_row(row: &[serde_json::Value]) -> Result<Self, CandleParseError> {
        if row.len() < 7 {
            return Err(CandleParseError::TooFewFields(row.len()));
        }

        let field = |index: usize| -> Result<String, CandleParseError> {
            row[index]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| CandleParseError::NotAString {
                    index,
                    value: row[index].to_string(),
                })
        };

        let raw_ts = field(0)?;
        let ts = raw_ts
            .trim()
            .parse::<i64>()
            .map_err(|_| CandleParseError::BadTimestamp(raw_ts.clone()))?;

        Ok(Candle {
            ts,
            o: field(1)?,
            h: field(2)?,
            l: field(3)?,
            c: field(4)?,
            vol: field(5)?,
            vol_ccy: field(6)?,
        })
    }

    /// Open time as a UTC datetime
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.ts)
    }
}

/// Candlestick granularity accepted by OKX
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bar {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    H6,
    H12,
    D1,
    D2,
    D3,
    W1,
    Mo1,
    Mo3,
    H6Utc,
    H12Utc,
    D1Utc,
    D2Utc,
    D3Utc,
    W1Utc,
    Mo1Utc,
    Mo3Utc,
}

/// Every bar OKX accepts, in canonical spelling
pub const BARS: &[Bar] = &[
    Bar::M1,
    Bar::M3,
    Bar::M5,
    Bar::M15,
    Bar::M30,
    Bar::H1,
    Bar::H2,
    Bar::H4,
    Bar::H6,
    Bar::H12,
    Bar::D1,
    Bar::D2,
    Bar::D3,
    Bar::W1,
    Bar::Mo1,
    Bar::Mo3,
    Bar::H6Utc,
    Bar::H12Utc,
    Bar::D1Utc,
    Bar::D2Utc,
    Bar::D3Utc,
    Bar::W1Utc,
    Bar::Mo1Utc,
    Bar::Mo3Utc,
];

impl Bar {
    /// Canonical OKX spelling, e.g. `15m`, `1H`, `1Dutc`
    pub fn as_str(&self) -> &'static str {
        match self {
            Bar::M1 => "1m",
            Bar::M3 => "3m",
            Bar::M5 => "5m",
            Bar::M15 => "15m",
            Bar::M30 => "30m",
            Bar::H1 => "1H",
            Bar::H2 => "2H",
            Bar::H4 => "4H",
            Bar::H6 => "6H",
            Bar::H12 => "12H",
            Bar::D1 => "1D",
            Bar::D2 => "2D",
            Bar::D3 => "3D",
            Bar::W1 => "1W",
            Bar::Mo1 => "1M",
            Bar::Mo3 => "3M",
            Bar::H6Utc => "6Hutc",
            Bar::H12Utc => "12Hutc",
            Bar::D1Utc => "1Dutc",
            Bar::D2Utc => "2Dutc",
            Bar::D3Utc => "3Dutc",
            Bar::W1Utc => "1Wutc",
            Bar::Mo1Utc => "1Mutc",
            Bar::Mo3Utc => "3Mutc",
        }
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown bar size: {0}")]
pub struct UnknownBar(pub String);

impl FromStr for Bar {
    type Err = UnknownBar;

    /// Accepts the canonical spelling plus lower-case hour/day/week aliases.
    /// `m` is always minutes and `M` always months.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(bar) = BARS.iter().find(|b| b.as_str() == s) {
            return Ok(*bar);
        }

        let (number, unit) = s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()));
        let normalized = match unit {
            "h" => format!("{}H", number),
            "d" => format!("{}D", number),
            "w" => format!("{}W", number),
            "hutc" | "Hutc" => format!("{}Hutc", number),
            "dutc" | "Dutc" => format!("{}Dutc", number),
            "wutc" | "Wutc" => format!("{}Wutc", number),
            _ => return Err(UnknownBar(s.to_string())),
        };

        BARS.iter()
            .find(|b| b.as_str() == normalized)
            .copied()
            .ok_or_else(|| UnknownBar(s.to_string()))
    }
}
