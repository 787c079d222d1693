//! Tick loading from CSV.
//!
//! Expected columns (header row required): `timestamp, symbol, price[, daily_volume]`.
//!
//! - Timestamps: `YYYY-MM-DDTHH:MM:SS[.f]`, the same with a space, or a bare date
//! - Volumes may carry thousands separators (`"1,234,567"`)
//! - An unparseable volume is logged and treated as "no cap"
//! - A bad timestamp or price fails the load, naming the line

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use ticklab_core::domain::{canonical_timestamp, DatasetHash, Tick};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: missing column '{column}'")]
    MissingColumn { line: u64, column: &'static str },

    #[error("line {line}: invalid timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: invalid price '{value}'")]
    Price { line: u64, value: String },
}

/// Ticks in file order plus a fingerprint of their content.
#[derive(Debug, Clone)]
pub struct LoadedTicks {
    pub ticks: Vec<Tick>,
    /// BLAKE3 over every parsed tick.
    pub dataset_hash: DatasetHash,
    /// Rows whose volume could not be parsed.
    pub volume_warnings: usize,
}

impl LoadedTicks {
    /// Distinct symbols in first-seen order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tick in &self.ticks {
            if !out.iter().any(|s| s == &tick.symbol) {
                out.push(tick.symbol.clone());
            }
        }
        out
    }
}

pub fn load_ticks(path: &Path) -> Result<LoadedTicks, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_ticks(file)?;
    info!(
        path = %path.display(),
        ticks = loaded.ticks.len(),
        dataset_hash = %loaded.dataset_hash,
        "Loaded tick data"
    );
    Ok(loaded)
}

pub fn parse_ticks<R: Read>(reader: R) -> Result<LoadedTicks, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ticks = Vec::new();
    let mut hasher = blake3::Hasher::new();
    let mut volume_warnings = 0;

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        if record.iter().all(str::is_empty) {
            continue;
        }

        let ts_raw = field(&record, 0, "timestamp", line)?;
        let timestamp = parse_timestamp(ts_raw).ok_or_else(|| LoadError::Timestamp {
            line,
            value: ts_raw.to_string(),
        })?;
        let symbol = field(&record, 1, "symbol", line)?;
        let price_raw = field(&record, 2, "price", line)?;
        let price: f64 = price_raw.parse().map_err(|_| LoadError::Price {
            line,
            value: price_raw.to_string(),
        })?;

        let daily_volume = match record.get(3).filter(|v| !v.is_empty()) {
            None => None,
            Some(raw) => {
                let parsed = parse_volume(raw);
                if parsed.is_none() {
                    volume_warnings += 1;
                    warn!(line, value = raw, "Unparseable daily volume; no order cap for this tick");
                }
                parsed
            }
        };

        hasher.update(canonical_timestamp(&timestamp).as_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(&price.to_le_bytes());
        hasher.update(&daily_volume.unwrap_or(f64::NAN).to_le_bytes());

        ticks.push(Tick {
            timestamp,
            symbol: symbol.to_string(),
            price,
            daily_volume,
        });
    }

    Ok(LoadedTicks {
        ticks,
        dataset_hash: DatasetHash::from_hash(hasher.finalize().to_hex().as_str()),
        volume_warnings,
    })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &'static str,
    line: u64,
) -> Result<&'r str, LoadError> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .ok_or(LoadError::MissingColumn { line, column })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Volume with thousands separators removed. `None` when not a number.
pub fn parse_volume(s: &str) -> Option<f64> {
    s.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(csv: &str) -> Result<LoadedTicks, LoadError> {
        parse_ticks(Cursor::new(csv.as_bytes().to_vec()))
    }

    #[test]
    fn parses_rows_with_and_without_volume() {
        let loaded = parse(
            "timestamp,symbol,price,daily_volume\n\
             2024-01-02T09:30:00,AAPL,185.5,\"1,234,567\"\n\
             2024-01-02 09:31:00.250,MSFT,370,\n\
             2024-01-03,AAPL,186.25\n",
        )
        .unwrap();

        assert_eq!(loaded.ticks.len(), 3);
        assert_eq!(loaded.ticks[0].daily_volume, Some(1_234_567.0));
        assert_eq!(loaded.ticks[1].daily_volume, None);
        assert_eq!(
            canonical_timestamp(&loaded.ticks[1].timestamp),
            "2024-01-02T09:31:00.250"
        );
        assert_eq!(canonical_timestamp(&loaded.ticks[2].timestamp), "2024-01-03T00:00:00");
        assert_eq!(loaded.symbols(), vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn bad_volume_means_no_cap() {
        let loaded = parse("timestamp,symbol,price,daily_volume\n2024-01-02,AAPL,1.0,lots\n").unwrap();
        assert_eq!(loaded.ticks[0].daily_volume, None);
        assert_eq!(loaded.volume_warnings, 1);
    }

    #[test]
    fn bad_timestamp_names_the_line() {
        let err = parse("timestamp,symbol,price\n2024-01-02,AAPL,1\nyesterday,AAPL,2\n").unwrap_err();
        match err {
            LoadError::Timestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_price_is_an_error() {
        let err = parse("timestamp,symbol,price\n2024-01-02,AAPL,abc\n").unwrap_err();
        assert!(matches!(err, LoadError::Price { line: 2, .. }));
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let err = parse("timestamp,symbol,price\n2024-01-02\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "symbol", .. }));
    }

    #[test]
    fn dataset_hash_tracks_content() {
        let a = parse("timestamp,symbol,price\n2024-01-02,AAPL,1\n").unwrap();
        let b = parse("timestamp,symbol,price\n2024-01-02,AAPL,1\n").unwrap();
        let c = parse("timestamp,symbol,price\n2024-01-02,AAPL,2\n").unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);
        assert_ne!(a.dataset_hash, c.dataset_hash);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_ticks(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
