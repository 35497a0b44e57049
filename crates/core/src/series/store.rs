//! Series storage traits.
//!
//! The cache keeps every series in memory; a [`SeriesRepository`] is where
//! they are read from at startup and written back to after refreshes.

use super::model::SymbolSeries;
use crate::errors::Result;

/// Storage interface for persisted series of one kind.
pub trait SeriesRepository: Send + Sync {
    /// Read every persisted series.
    ///
    /// A series whose stored form cannot be decoded comes back empty so the
    /// next lookup refreshes it. Only failures affecting the whole store
    /// (an unreadable directory) are errors.
    fn load_all(&self) -> Result<Vec<SymbolSeries>>;

    /// Durably write one series, replacing what was stored for its symbol.
    fn save(&self, series: &SymbolSeries) -> Result<()>;
}
