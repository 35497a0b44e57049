//! Upstream price provider abstractions and implementations.
//!
//! This module contains:
//! - The provider traits (`KeyedSeriesProvider`, `SeriesProvider`, `LiveQuoteProvider`)
//! - Concrete providers: Alpha Vantage (intraday equities, keyed and throttled),
//!   CoinGecko (crypto series and universe listing), IEX Cloud (live equity quote)
//!
//! Providers hold their own HTTP client, base URL and timeouts. They are built
//! once per process and shared by reference.

mod http;
mod traits;

pub mod alpha_vantage;
pub mod coingecko;
pub mod iex_cloud;

pub use traits::{KeyedSeriesProvider, LiveQuoteProvider, SeriesProvider};
