//! CSV-file implementation of [`SeriesRepository`].
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, rows newest first:
//! - crypto: `time,price`
//! - equity: `time,open,high,low,close,volume`

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use pricetrail_market_data::{PricePoint, SeriesKind};

use super::model::SymbolSeries;
use super::store::SeriesRepository;
use crate::constants::TIMESTAMP_FORMAT;
use crate::errors::{Result, StorageError};

const CRYPTO_HEADER: [&str; 2] = ["time", "price"];
const EQUITY_HEADER: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

/// Column positions resolved from a file header.
struct Columns {
    time: usize,
    price: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(kind: SeriesKind, headers: &StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let price_column = match kind {
            SeriesKind::Crypto => "price",
            SeriesKind::Equity => "close",
        };
        Some(Self {
            time: find("time")?,
            price: find(price_column)?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

/// Stores each series of one kind as a CSV file in a directory.
pub struct CsvSeriesRepository {
    dir: PathBuf,
    kind: SeriesKind,
}

impl CsvSeriesRepository {
    pub fn new(dir: impl Into<PathBuf>, kind: SeriesKind) -> Self {
        Self {
            dir: dir.into(),
            kind,
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    fn read_points(&self, path: &Path) -> Result<Vec<PricePoint>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| StorageError::io(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| StorageError::malformed(path, e.to_string()))?
            .clone();
        let columns = Columns::resolve(self.kind, &headers).ok_or_else(|| {
            StorageError::malformed(path, format!("unexpected header {:?}", headers))
        })?;

        let mut points = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let line = idx + 2;
            let record = record.map_err(|e| StorageError::malformed(path, e.to_string()))?;
            let point = parse_row(self.kind, &columns, &record).ok_or_else(|| {
                StorageError::malformed(path, format!("bad row at line {}", line))
            })?;
            points.push(point);
        }
        Ok(points)
    }

    fn write_points(&self, path: &Path, series: &SymbolSeries) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| StorageError::io(path, e))?;

        let write_err = |e: csv::Error| StorageError::io(path, e);
        match self.kind {
            SeriesKind::Crypto => {
                writer.write_record(CRYPTO_HEADER).map_err(write_err)?;
                for point in series.iter_desc() {
                    writer
                        .write_record([format_time(&point.time), point.price.to_string()])
                        .map_err(write_err)?;
                }
            }
            SeriesKind::Equity => {
                writer.write_record(EQUITY_HEADER).map_err(write_err)?;
                for point in series.iter_desc() {
                    writer
                        .write_record([
                            format_time(&point.time),
                            format_optional(point.open),
                            format_optional(point.high),
                            format_optional(point.low),
                            point.price.to_string(),
                            format_optional(point.volume),
                        ])
                        .map_err(write_err)?;
                }
            }
        }

        writer.flush().map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }
}

fn format_time(time: &NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

fn format_optional(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_optional(record: &StringRecord, column: Option<usize>) -> Option<Option<Decimal>> {
    match column.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
        None => Some(None),
        Some(s) => Decimal::from_str(s).ok().map(Some),
    }
}

fn parse_row(kind: SeriesKind, columns: &Columns, record: &StringRecord) -> Option<PricePoint> {
    let time = NaiveDateTime::parse_from_str(record.get(columns.time)?, TIMESTAMP_FORMAT).ok()?;
    let price = Decimal::from_str(record.get(columns.price)?).ok()?;

    let mut point = PricePoint::new(time, price);
    if kind == SeriesKind::Equity {
        point.open = parse_optional(record, columns.open)?;
        point.high = parse_optional(record, columns.high)?;
        point.low = parse_optional(record, columns.low)?;
        point.volume = parse_optional(record, columns.volume)?;
    }
    Some(point)
}

impl SeriesRepository for CsvSeriesRepository {
    fn load_all(&self) -> Result<Vec<SymbolSeries>> {
        if !self.dir.exists() {
            info!("No {} data at {}, starting empty", self.kind, self.dir.display());
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let mut loaded: Vec<SymbolSeries> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let symbol = self.kind.normalize_symbol(stem);

            let series = match self.read_points(&path) {
                Ok(points) => SymbolSeries::with_points(symbol, self.kind, points),
                Err(e) => {
                    warn!("{}; {} will be refetched", e, symbol);
                    SymbolSeries::new(symbol, self.kind)
                }
            };
            debug!("Loaded {} points for {}", series.len(), series.symbol());

            match loaded
                .iter_mut()
                .find(|s| s.symbol() == series.symbol())
            {
                Some(existing) => {
                    warn!(
                        "{} holds more than one file for {}, keeping the later ceiling",
                        self.dir.display(),
                        series.symbol()
                    );
                    if series.ceiling() > existing.ceiling() {
                        *existing = series;
                    }
                }
                None => loaded.push(series),
            }
        }

        info!(
            "Read {} {} series from {}",
            loaded.len(),
            self.kind,
            self.dir.display()
        );
        Ok(loaded)
    }

    fn save(&self, series: &SymbolSeries) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let path = self.path_for(series.symbol());
        let staging = path.with_extension("csv.tmp");
        self.write_points(&staging, series)?;
        fs::rename(&staging, &path).map_err(|e| StorageError::io(&path, e))?;

        debug!("Saved {} points to {}", series.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_equity_file_layout() {
        let dir = tempdir().unwrap();
        let repo = CsvSeriesRepository::new(dir.path(), SeriesKind::Equity);
        let series = SymbolSeries::with_points(
            "TSLA",
            SeriesKind::Equity,
            [
                PricePoint::ohlcv(at(6, 19, 59), dec!(12), dec!(12.1), dec!(11.9), dec!(12.05), dec!(900)),
                PricePoint::ohlcv(at(6, 20, 0), dec!(12.1), dec!(12.2), dec!(12), dec!(12.15), dec!(1500)),
            ],
        );

        repo.save(&series).unwrap();

        let written = fs::read_to_string(dir.path().join("TSLA.csv")).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines[0], "time,open,high,low,close,volume");
        assert_eq!(lines[1], "2021-08-06 20:00:00,12.1,12.2,12,12.15,1500");
        assert_eq!(lines[2], "2021-08-06 19:59:00,12,12.1,11.9,12.05,900");
        assert!(!dir.path().join("TSLA.csv.tmp").exists());

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded, vec![series]);
    }

    #[test]
    fn test_crypto_file_layout() {
        let dir = tempdir().unwrap();
        let repo = CsvSeriesRepository::new(dir.path(), SeriesKind::Crypto);
        let series = SymbolSeries::with_points(
            "btc",
            SeriesKind::Crypto,
            [PricePoint::new(at(9, 13, 0), dec!(45123.5))],
        );

        repo.save(&series).unwrap();

        let written = fs::read_to_string(dir.path().join("btc.csv")).unwrap();
        assert_eq!(written, "time,price\n2021-08-09 13:00:00,45123.5\n");
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("btc.csv"),
            "time,price\n2021-08-09 13:00:00,not-a-number\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("eth.csv"),
            "time,price\n2021-08-09 13:00:00,3100\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let repo = CsvSeriesRepository::new(dir.path(), SeriesKind::Crypto);
        let mut loaded = repo.load_all().unwrap();
        loaded.sort_by(|a, b| a.symbol().cmp(b.symbol()));

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].symbol(), "btc");
        assert!(loaded[0].is_empty());
        assert_eq!(loaded[1].symbol(), "eth");
        assert_eq!(loaded[1].len(), 1);
    }

    #[test]
    fn test_case_duplicates_keep_later_ceiling() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("BTC.csv"),
            "time,price\n2021-08-09 13:00:00,45000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("btc.csv"),
            "time,price\n2021-08-07 13:00:00,41000\n",
        )
        .unwrap();

        let repo = CsvSeriesRepository::new(dir.path(), SeriesKind::Crypto);
        let loaded = repo.load_all().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].symbol(), "btc");
        assert_eq!(loaded[0].ceiling(), Some(at(9, 13, 0)));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let repo = CsvSeriesRepository::new(dir.path().join("absent"), SeriesKind::Equity);
        assert!(repo.load_all().unwrap().is_empty());
    }
}
