//! Per-symbol price series cache.
//!
//! - [`model`] - The in-memory series and its merge/staleness rules
//! - [`store`] - Storage trait for persisted series
//! - [`csv_store`] - One-CSV-file-per-symbol repository
//! - [`service`] - The cache itself, refreshing series through a fetcher
//!
//! ```text
//! SymbolSeriesStore → SeriesFetcher (market-data crate)
//!        ↓
//! SeriesRepository (CSV files)
//! ```

pub mod csv_store;
pub mod model;
pub mod service;
pub mod store;

pub use csv_store::CsvSeriesRepository;
pub use model::SymbolSeries;
pub use service::SymbolSeriesStore;
pub use store::SeriesRepository;
