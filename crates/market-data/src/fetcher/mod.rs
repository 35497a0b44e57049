//! Retrying fetchers.
//!
//! A fetcher wraps one provider and turns its fallible single request into a
//! bounded series of attempts. Fetchers never return errors: every failure
//! ends as `None` after logging, and callers treat that as "no data".

mod policy;

pub use policy::{
    with_retry, RetryPolicy, DEFAULT_MAX_ATTEMPTS, RATE_LIMITED_DELAY, TRANSIENT_DELAY,
};

use std::sync::Arc;

use async_trait::async_trait;
use log::error;
use rust_decimal::Decimal;

use crate::credentials::{CredentialRotator, CredentialSlot};
use crate::errors::MarketDataError;
use crate::models::{CoinListing, PricePoint};
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::{KeyedSeriesProvider, LiveQuoteProvider, SeriesProvider};

/// One logical time-series fetch for a symbol.
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    fn id(&self) -> &'static str;

    /// `None` when the provider had nothing usable after all attempts.
    async fn fetch(&self, symbol: &str) -> Option<Vec<PricePoint>>;
}

/// One logical live-price lookup for a symbol.
#[async_trait]
pub trait LivePriceFetcher: Send + Sync {
    fn id(&self) -> &'static str;

    async fn latest_price(&self, symbol: &str) -> Option<Decimal>;
}

/// Fetcher for a key-authenticated provider driven by a [`CredentialRotator`].
///
/// The rotator is consulted before every attempt and charged once per
/// attempt. An exhausted pool stops the fetch without touching the network.
pub struct RateLimitedFetcher<P> {
    provider: P,
    rotator: Arc<CredentialRotator>,
    policy: RetryPolicy,
}

impl<P: KeyedSeriesProvider> RateLimitedFetcher<P> {
    pub fn new(provider: P, rotator: Arc<CredentialRotator>) -> Self {
        Self::with_policy(provider, rotator, RetryPolicy::rate_limited())
    }

    pub fn with_policy(provider: P, rotator: Arc<CredentialRotator>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            rotator,
            policy,
        }
    }
}

#[async_trait]
impl<P: KeyedSeriesProvider> SeriesFetcher for RateLimitedFetcher<P> {
    fn id(&self) -> &'static str {
        self.provider.id()
    }

    async fn fetch(&self, symbol: &str) -> Option<Vec<PricePoint>> {
        let provider = &self.provider;
        let rotator = self.rotator.as_ref();

        with_retry(provider.id(), symbol, &self.policy, move |_| async move {
            match rotator.current() {
                CredentialSlot::Active(credential) => {
                    rotator.record_call(&credential);
                    provider.fetch_series(symbol, credential.key()).await
                }
                CredentialSlot::Exhausted => {
                    error!(
                        "{}: no API key left, skipping fetch for {}",
                        provider.id(),
                        symbol
                    );
                    Err(MarketDataError::CredentialsExhausted {
                        provider: provider.id().to_string(),
                    })
                }
            }
        })
        .await
    }
}

/// Fetcher for keyless providers: retries transient failures only.
pub struct RetryingFetcher<P> {
    provider: P,
    policy: RetryPolicy,
}

impl<P> RetryingFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self::with_policy(provider, RetryPolicy::transient())
    }

    pub fn with_policy(provider: P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl RetryingFetcher<CoinGeckoProvider> {
    /// The CoinGecko coin listing, retried like a series fetch.
    pub async fn universe(&self) -> Option<&[CoinListing]> {
        let provider = &self.provider;
        with_retry(provider.id(), "coin list", &self.policy, move |_| {
            provider.universe()
        })
        .await
    }
}

#[async_trait]
impl<P: SeriesProvider> SeriesFetcher for RetryingFetcher<P> {
    fn id(&self) -> &'static str {
        self.provider.id()
    }

    async fn fetch(&self, symbol: &str) -> Option<Vec<PricePoint>> {
        let provider = &self.provider;
        with_retry(provider.id(), symbol, &self.policy, move |_| {
            provider.fetch_series(symbol)
        })
        .await
    }
}

#[async_trait]
impl<P: LiveQuoteProvider> LivePriceFetcher for RetryingFetcher<P> {
    fn id(&self) -> &'static str {
        self.provider.id()
    }

    async fn latest_price(&self, symbol: &str) -> Option<Decimal> {
        let provider = &self.provider;
        with_retry(provider.id(), symbol, &self.policy, move |_| {
            provider.latest_price(symbol)
        })
        .await
    }
}
