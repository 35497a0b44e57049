//! Pricetrail Market Data Crate
//!
//! Upstream access for the pricetrail price cache: provider clients, the
//! quota-aware credential pool and the retrying fetchers built on top of them.
//!
//! # Overview
//!
//! - Intraday equity series from Alpha Vantage, authenticated with a rotating
//!   pool of API keys
//! - Hourly crypto series and the coin universe from CoinGecko
//! - Live equity quotes from IEX Cloud
//!
//! # Architecture
//!
//! ```text
//! +--------------------+     +--------------------+
//! | CredentialRotator  | --> | RateLimitedFetcher |  (5 x 15 s, key per attempt)
//! +--------------------+     +--------------------+
//!                                      |
//!                            +--------------------+
//!                            |  RetryingFetcher   |  (5 x 5 s, transient only)
//!                            +--------------------+
//!                                      |
//!                                      v
//!                            +--------------------+
//!                            |     Provider       |  (one request per call)
//!                            +--------------------+
//!                                      |
//!                                      v
//!                            +--------------------+
//!                            |    PricePoint      |  (minute resolution)
//!                            +--------------------+
//! ```
//!
//! Providers return [`MarketDataError`]; fetchers swallow it and return
//! `Option`, so no upstream failure ever reaches the cache layer as an error.

pub mod credentials;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use credentials::{
    ActiveCredential, Credential, CredentialRotator, CredentialSlot, DEFAULT_SOFT_LIMIT,
};
pub use errors::{MarketDataError, RetryClass};
pub use fetcher::{
    LivePriceFetcher, RateLimitedFetcher, RetryPolicy, RetryingFetcher, SeriesFetcher,
};
pub use models::{round_to_minute, truncate_to_minute, CoinListing, PricePoint, SeriesKind};

pub use provider::alpha_vantage::{is_rate_limited, AlphaVantageProvider, RATE_LIMIT_MARKER};
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::iex_cloud::IexCloudProvider;
pub use provider::{KeyedSeriesProvider, LiveQuoteProvider, SeriesProvider};
