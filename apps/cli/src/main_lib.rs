use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pricetrail_core::{
    AlertRunner, Clock, CryptoUniverse, CsvSeriesRepository, SourceDispatcher, SymbolSeriesStore,
    SystemClock,
};
use pricetrail_market_data::{
    AlphaVantageProvider, CoinGeckoProvider, CredentialRotator, IexCloudProvider,
    RateLimitedFetcher, RetryingFetcher, SeriesKind,
};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("PT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Everything a run needs, wired from configuration.
pub struct App {
    pub runner: AlertRunner,
    pub equity: Arc<SymbolSeriesStore>,
    pub crypto: Arc<SymbolSeriesStore>,
}

impl App {
    /// Persist both caches. Both are attempted even if the first fails.
    pub async fn save(&self) -> anyhow::Result<()> {
        let equity = self.equity.save().await;
        let crypto = self.crypto.save().await;
        equity?;
        crypto?;
        Ok(())
    }
}

pub async fn build_app(config: &Config) -> anyhow::Result<App> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.alpha_vantage_keys.is_empty() {
        tracing::warn!("No Alpha Vantage keys configured; equity series cannot be refreshed");
    }
    let rotator = Arc::new(CredentialRotator::new(
        "ALPHA_VANTAGE",
        config.alpha_vantage_keys.iter().cloned(),
        config.alpha_vantage_soft_limit,
    ));
    let equity_fetcher = Arc::new(RateLimitedFetcher::new(AlphaVantageProvider::new(), rotator));

    let mut equity = SymbolSeriesStore::new(
        SeriesKind::Equity,
        Arc::new(CsvSeriesRepository::new(config.stocks_dir(), SeriesKind::Equity)),
        equity_fetcher,
        clock.clone(),
    );
    match &config.iex_token {
        Some(token) => {
            equity = equity.with_live_prices(Arc::new(RetryingFetcher::new(
                IexCloudProvider::new(token.clone()),
            )));
        }
        None => tracing::warn!("No IEX Cloud token configured; current prices will be NA"),
    }
    equity.load()?;

    let coingecko = Arc::new(RetryingFetcher::new(CoinGeckoProvider::new()));
    let universe = match coingecko.universe().await {
        Some(listings) => CryptoUniverse::from_listings(listings),
        None => {
            tracing::warn!("CoinGecko coin list unavailable; every batch will prefer equities");
            CryptoUniverse::default()
        }
    };
    tracing::info!("Crypto universe holds {} symbols", universe.len());

    let crypto = SymbolSeriesStore::new(
        SeriesKind::Crypto,
        Arc::new(CsvSeriesRepository::new(config.cryptos_dir(), SeriesKind::Crypto)),
        coingecko,
        clock,
    );
    crypto.load()?;

    let equity = Arc::new(equity);
    let crypto = Arc::new(crypto);
    let dispatcher = SourceDispatcher::new(equity.clone(), crypto.clone());

    Ok(App {
        runner: AlertRunner::new(dispatcher, universe),
        equity,
        crypto,
    })
}
