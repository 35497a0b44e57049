//! Pricetrail Core - price cache, price resolution and source dispatch.
//!
//! This crate keeps a per-symbol time series cache fed by the fetchers of
//! the `pricetrail-market-data` crate, resolves prices around alert times
//! and routes each lookup to the equity or crypto cache.

pub mod alerts;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod prices;
pub mod series;
pub mod utils;

pub use alerts::{Alert, AlertBatch, AlertRunner, AlertSource, ReportRow, ReportSink, RunSummary};
pub use dispatch::{classify, CryptoUniverse, SourceDispatcher};
pub use prices::{price_at, PriceSlot, PriceSource, PriceTuple};
pub use series::{CsvSeriesRepository, SeriesRepository, SymbolSeries, SymbolSeriesStore};
pub use utils::{Clock, FixedClock, SystemClock};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
