//! Historical kline downloader
//!
//! OKX serves history candles newest-first, at most 100 per page, and only
//! supports a `before` cursor. [`KlineDownloader`] walks that cursor backward
//! from the end date until it reaches the start date, then returns the
//! candles in ascending order.
//!
//! The page source is a trait so the walk can be driven by the real
//! [`OkxClient`] or by a scripted source in tests.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::save_csv;
use crate::okx::client::{decode_envelope, OkxClient};
use crate::okx::{inst_id, HttpMethod, HISTORY_CANDLES};
use crate::types::{Bar, Candle};

/// Maximum rows OKX returns per history-candles call
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Pause between consecutive page requests
pub const DEFAULT_THROTTLE_MS: u64 = 200;

pub const DEFAULT_QUOTE: &str = "USDT";

#[derive(Debug, Error)]
pub enum KlineError {
    #[error("invalid date '{input}', expected YYYY-MM-DD")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },

    #[error("page request before {before} failed: {reason}")]
    PageFailed { before: i64, reason: String },

    #[error("failed to write candles: {0}")]
    Write(#[source] anyhow::Error),
}

/// Millisecond bounds of a download, both taken at UTC midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_ts: i64,
    pub end_ts: i64,
}

impl DateRange {
    /// Parse two `YYYY-MM-DD` dates; `start` may equal `end` but not exceed it
    pub fn from_dates(start: &str, end: &str) -> Result<Self, KlineError> {
        let start_ts = date_to_ms(start)?;
        let end_ts = date_to_ms(end)?;
        if start_ts > end_ts {
            return Err(KlineError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start_ts, end_ts })
    }
}

/// `YYYY-MM-DD` at 00:00 UTC, in epoch milliseconds
pub fn date_to_ms(date: &str) -> Result<i64, KlineError> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|source| {
        KlineError::InvalidDate {
            input: date.to_string(),
            source,
        }
    })?;
    Ok(day.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

/// One history-candles call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub inst_id: String,
    pub bar: Bar,
    /// Only candles strictly older than this are requested
    pub before: i64,
    pub limit: u32,
}

/// Outcome of fetching one page
///
/// `Empty` means the exchange has nothing more; `Failed` means we could not
/// find out. The two are never conflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    Page(Vec<Candle>),
    Empty,
    Failed(String),
}

/// Anything that can serve one page of newest-first candles
pub trait PageSource {
    fn fetch_page(&mut self, request: &PageRequest) -> PageResult;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn fetch_page(&mut self, request: &PageRequest) -> PageResult {
        (**self).fetch_page(request)
    }
}

impl OkxClient {
    /// Fetch one page of `GET /api/v5/market/history-candles`
    pub fn history_candles(&self, request: &PageRequest) -> PageResult {
        let params = json!({
            "instId": request.inst_id,
            "bar": request.bar.as_str(),
            "before": request.before,
            "limit": request.limit,
        });

        let rows: Vec<Vec<serde_json::Value>> = match self
            .request(HttpMethod::Get, HISTORY_CANDLES, Some(&params))
            .and_then(decode_envelope::<Vec<Vec<serde_json::Value>>>)
        {
            Ok(rows) => rows,
            Err(e) => return PageResult::Failed(e.to_string()),
        };

        if rows.is_empty() {
            return PageResult::Empty;
        }

        match rows.iter().map(|r| Candle::from_row(r)).collect::<Result<Vec<_>, _>>() {
            Ok(candles) => PageResult::Page(candles),
            Err(e) => PageResult::Failed(format!("malformed candle row: {}", e)),
        }
    }
}

impl PageSource for OkxClient {
    fn fetch_page(&mut self, request: &PageRequest) -> PageResult {
        self.history_candles(request)
    }
}

/// Backward-paginating kline downloader
pub struct KlineDownloader<S> {
    source: S,
    limit: u32,
    throttle: Duration,
    trim_to_range: bool,
    quote: String,
}

impl<S: PageSource> KlineDownloader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            limit: MAX_PAGE_LIMIT,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            trim_to_range: false,
            quote: DEFAULT_QUOTE.to_string(),
        }
    }

    /// Rows per page, clamped to 1..=100
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Drop candles older than the start date from the final page
    pub fn with_trim_to_range(mut self, trim: bool) -> Self {
        self.trim_to_range = trim;
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = quote.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Download `[start_date, end_date]` and optionally save it as CSV
    ///
    /// Returns candles in ascending timestamp order. Without trimming the
    /// final page may reach past `start_date`; those rows are kept.
    pub fn download(
        &mut self,
        symbol: &str,
        bar: Bar,
        start_date: &str,
        end_date: &str,
        save_path: Option<&Path>,
    ) -> Result<Vec<Candle>, KlineError> {
        let range = DateRange::from_dates(start_date, end_date)?;
        let candles = self.fetch_range(symbol, bar, range)?;

        if let Some(path) = save_path {
            save_csv(path, &candles).map_err(KlineError::Write)?;
        }

        Ok(candles)
    }

    /// The pagination walk itself, without any file output
    pub fn fetch_range(
        &mut self,
        symbol: &str,
        bar: Bar,
        range: DateRange,
    ) -> Result<Vec<Candle>, KlineError> {
        let inst_id = inst_id(symbol, &self.quote);
        let mut all_candles: Vec<Candle> = Vec::new();
        let mut cursor = range.end_ts;
        let mut last_request: Option<Instant> = None;

        info!(
            "Downloading {} {} from {} to {}",
            inst_id, bar, range.start_ts, range.end_ts
        );

        while cursor > range.start_ts {
            if let Some(previous) = last_request {
                let elapsed = previous.elapsed();
                if elapsed < self.throttle {
                    sleep(self.throttle - elapsed);
                }
            }

            let request = PageRequest {
                inst_id: inst_id.clone(),
                bar,
                before: cursor,
                limit: self.limit,
            };
            last_request = Some(Instant::now());

            let mut page = match self.source.fetch_page(&request) {
                PageResult::Page(page) if !page.is_empty() => page,
                PageResult::Page(_) | PageResult::Empty => {
                    info!("Fetched 0 candles before {}, done", cursor);
                    break;
                }
                PageResult::Failed(reason) => {
                    return Err(KlineError::PageFailed {
                        before: cursor,
                        reason,
                    });
                }
            };

            let fetched = page.len();
            page.retain(|c| c.ts < cursor);
            if page.is_empty() {
                return Err(KlineError::PageFailed {
                    before: cursor,
                    reason: format!("none of {} rows are older than the cursor", fetched),
                });
            }
            if page.len() < fetched {
                warn!(
                    "Dropped {} of {} rows not older than {}",
                    fetched - page.len(),
                    fetched,
                    cursor
                );
            }

            info!("Fetched {} candles ({}, {})", page.len(), inst_id, bar);

            // pages are newest-first, so the oldest kept row bounds the next cursor
            let last_ts = page.iter().map(|c| c.ts).min().unwrap_or(cursor);
            all_candles.extend(page);

            if last_ts <= range.start_ts {
                debug!("Reached start boundary at {}", last_ts);
                break;
            }
            cursor = last_ts;
        }

        all_candles.reverse();
        all_candles.dedup_by_key(|c| c.ts);
        all_candles.retain(|c| c.ts < range.end_ts);

        if self.trim_to_range {
            all_candles.retain(|c| c.ts >= range.start_ts);
        }

        info!("Total candles fetched: {}", all_candles.len());
        Ok(all_candles)
    }
}
