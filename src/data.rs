//! Candle persistence
//!
//! Writes and reads the downloader's CSV format:
//! `ts,o,h,l,c,vol,volCcy`, one row per candle, ascending by `ts`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::Candle;

/// Column header of the output file
pub const CSV_HEADER: [&str; 7] = ["ts", "o", "h", "l", "c", "vol", "volCcy"];

/// Save candles to CSV, creating parent directories and overwriting any existing file
///
/// The header is always written, even when `candles` is empty.
pub fn save_csv(path: impl AsRef<Path>, candles: &[Candle]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;

    writer.write_record(CSV_HEADER)?;
    for candle in candles {
        writer.serialize(candle)?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", candles.len(), path.display());
    Ok(())
}

/// Load candles from a CSV file written by [`save_csv`]
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(CSV_HEADER.iter().copied()) {
        anyhow::bail!(
            "Unexpected CSV header in {}: {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        );
    }

    let mut candles = Vec::new();
    for (row_idx, result) in reader.deserialize().enumerate() {
        let candle: Candle = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        candles.push(candle);
    }

    Ok(candles)
}
