//! Price report output as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use pricetrail_core::errors::StorageError;
use pricetrail_core::{Error, PriceSlot, ReportRow, ReportSink, Result};

pub const REPORT_HEADER: [&str; 11] = [
    "Username",
    "Date",
    "Time",
    "CashTag",
    "Alert Price",
    "2hr",
    "4hr",
    "1D",
    "1w",
    "Current",
    "Tweet",
];

/// Written wherever no price was found.
const NOT_FOUND: &str = "NA";

fn render(slot: Option<PriceSlot>) -> String {
    match slot {
        Some(PriceSlot::Price(price)) => price.to_string(),
        Some(PriceSlot::NotFound) | None => NOT_FOUND.to_string(),
    }
}

pub struct CsvReportSink<W: Write> {
    writer: Writer<W>,
}

impl CsvReportSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| StorageError::io(path, e))?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer
            .write_record(REPORT_HEADER)
            .map_err(|e| Error::Report(e.to_string()))?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Report(e.to_string()))
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        let alert = &row.alert;
        let prices = &row.prices;
        self.writer
            .write_record([
                alert.author.clone(),
                alert.created_at.format("%Y-%m-%d").to_string(),
                alert.created_at.format("%H:%M:%S").to_string(),
                alert.symbol.clone(),
                render(Some(prices.alert)),
                render(Some(prices.two_hours)),
                render(Some(prices.four_hours)),
                render(Some(prices.one_day)),
                render(Some(prices.one_week)),
                render(prices.current),
                alert.text.clone(),
            ])
            .map_err(|e| Error::Report(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| Error::Report(e.to_string()))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::Report(e.to_string()))
    }
}
