//! Provider trait definitions.
//!
//! Providers perform exactly one upstream request per call and report every
//! failure as a [`MarketDataError`]. Retry, backoff and credential accounting
//! live in [`crate::fetcher`], not here.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::PricePoint;

/// A time-series source that authenticates every request with an API key
/// drawn from a rotating pool.
#[async_trait]
pub trait KeyedSeriesProvider: Send + Sync {
    /// Constant identifier such as "ALPHA_VANTAGE", used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the provider's fixed historical window for `symbol`.
    ///
    /// Points are returned in provider order with minute-rounded timestamps.
    async fn fetch_series(
        &self,
        symbol: &str,
        api_key: &str,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}

/// A keyless time-series source.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn fetch_series(&self, symbol: &str) -> Result<Vec<PricePoint>, MarketDataError>;
}

/// A source of the current traded price of a symbol.
#[async_trait]
pub trait LiveQuoteProvider: Send + Sync {
    fn id(&self) -> &'static str;

    async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError>;
}
