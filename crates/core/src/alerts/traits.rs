use super::model::{AlertBatch, ReportRow};
use crate::errors::Result;

/// Where alerts come from.
pub trait AlertSource {
    /// All pending alerts, one batch per author.
    fn batches(&mut self) -> Result<Vec<AlertBatch>>;
}

/// Where resolved rows go.
pub trait ReportSink {
    fn write_row(&mut self, row: &ReportRow) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
