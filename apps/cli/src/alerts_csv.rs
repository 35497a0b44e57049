//! Alert input from a CSV file with columns `author,symbol,created_at,text`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use pricetrail_core::constants::TIMESTAMP_FORMAT;
use pricetrail_core::errors::{StorageError, ValidationError};
use pricetrail_core::{Alert, AlertBatch, AlertSource, Result};

#[derive(Debug, Deserialize)]
struct AlertRecord {
    author: String,
    symbol: String,
    created_at: String,
    #[serde(default)]
    text: String,
}

/// Parse an alert timestamp: `%Y-%m-%d %H:%M:%S` or RFC 3339 (taken as UTC).
fn parse_created_at(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_utc()))
}

pub struct CsvAlertSource {
    path: PathBuf,
}

impl CsvAlertSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_alerts(path: &Path) -> Result<Vec<Alert>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| StorageError::io(path, e))?;

        let mut alerts = Vec::new();
        for (idx, record) in reader.deserialize::<AlertRecord>().enumerate() {
            let line = idx + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("{}:{}: skipping unreadable alert: {}", path.display(), line, e);
                    continue;
                }
            };

            let symbol = record.symbol.trim_start_matches('$').to_string();
            if symbol.is_empty() {
                tracing::warn!("{}:{}: skipping alert without symbol", path.display(), line);
                continue;
            }
            let Some(created_at) = parse_created_at(&record.created_at) else {
                tracing::warn!(
                    "{}:{}: skipping alert with bad timestamp {:?}",
                    path.display(),
                    line,
                    record.created_at
                );
                continue;
            };

            alerts.push(Alert {
                author: record.author,
                symbol,
                created_at,
                text: record.text,
            });
        }

        if alerts.is_empty() {
            return Err(ValidationError::InvalidInput(format!(
                "{} contains no usable alerts",
                path.display()
            ))
            .into());
        }
        Ok(alerts)
    }
}

impl AlertSource for CsvAlertSource {
    fn batches(&mut self) -> Result<Vec<AlertBatch>> {
        let alerts = Self::read_alerts(&self.path)?;
        tracing::info!("Read {} alerts from {}", alerts.len(), self.path.display());
        Ok(AlertBatch::group_by_author(alerts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reads_and_groups_by_author() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alerts.csv");
        fs::write(
            &path,
            "author,symbol,created_at,text\n\
             alice,$TSLA,2021-08-09 13:50:33,\"$TSLA breaking out\"\n\
             bob,btc,2021-08-09T14:00:00Z,btc dip\n\
             alice,AMC,not-a-date,ignored\n\
             alice,AMC,2021-08-10 09:31:00,AMC again\n",
        )
        .unwrap();

        let batches = CsvAlertSource::new(&path).batches().unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].author, "alice");
        assert_eq!(batches[0].symbols(), vec!["TSLA", "AMC"]);
        assert_eq!(
            batches[0].alerts[0].created_at,
            NaiveDate::from_ymd_opt(2021, 8, 9)
                .unwrap()
                .and_hms_opt(13, 50, 33)
                .unwrap()
        );
        assert_eq!(batches[1].author, "bob");
        assert_eq!(batches[1].alerts[0].text, "btc dip");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let mut source = CsvAlertSource::new(dir.path().join("absent.csv"));
        assert!(source.batches().is_err());
    }
}
