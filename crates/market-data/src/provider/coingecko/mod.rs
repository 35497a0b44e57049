//! CoinGecko provider for cryptocurrency prices.
//!
//! Two endpoints are used:
//! - `/coins/list` maps ticker symbols to CoinGecko ids. It is fetched once per
//!   process and kept in memory.
//! - `/coins/{id}/market_chart` returns `{ "prices": [[epoch_ms, price], ...] }`
//!   for the last 30 days at hourly granularity.
//!
//! No API key is required.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::http::{build_client, build_url, get_text, number_to_decimal};
use crate::errors::MarketDataError;
use crate::models::{CoinListing, PricePoint};
use crate::provider::SeriesProvider;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const CHART_TIMEOUT: Duration = Duration::from_secs(60);
const CHART_DAYS: &str = "30";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(serde_json::Number, serde_json::Number)>,
}

/// CoinGecko market chart provider.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    universe: OnceCell<Vec<CoinListing>>,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at another host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(CHART_TIMEOUT),
            base_url: base_url.into(),
            universe: OnceCell::new(),
        }
    }

    fn parse_error(message: String) -> MarketDataError {
        MarketDataError::Parse {
            provider: PROVIDER_ID.to_string(),
            message,
        }
    }

    /// The full coin listing, fetched on first use and cached afterwards.
    ///
    /// A failed fetch is not cached; the next call tries again.
    pub async fn universe(&self) -> Result<&[CoinListing], MarketDataError> {
        let listings = self
            .universe
            .get_or_try_init(|| async {
                let url = build_url(PROVIDER_ID, &self.base_url, "/coins/list", &[])?;
                let text = get_text(&self.client, PROVIDER_ID, url, LIST_TIMEOUT, None).await?;
                let listings: Vec<CoinListing> = serde_json::from_str(&text)
                    .map_err(|e| Self::parse_error(format!("Failed to parse coin list: {}", e)))?;
                info!("CoinGecko: loaded {} coin listings", listings.len());
                Ok::<_, MarketDataError>(listings)
            })
            .await?;
        Ok(listings.as_slice())
    }

    /// Resolve a ticker symbol to its CoinGecko id. First listing wins.
    pub async fn resolve_id(&self, symbol: &str) -> Result<String, MarketDataError> {
        self.universe()
            .await?
            .iter()
            .find(|coin| coin.matches(symbol))
            .map(|coin| coin.id.clone())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    fn parse_market_chart(body: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let response: MarketChartResponse = serde_json::from_str(body)
            .map_err(|e| Self::parse_error(format!("Failed to parse market chart: {}", e)))?;

        Ok(response
            .prices
            .iter()
            .filter_map(|(millis, price)| {
                let millis = millis
                    .as_i64()
                    .or_else(|| millis.as_f64().map(|m| m as i64))?;
                let time = DateTime::from_timestamp_millis(millis)?.naive_utc();
                Some(PricePoint::new(time, number_to_decimal(price)?))
            })
            .collect())
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_series(&self, symbol: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let id = self.resolve_id(symbol).await?;
        let path = format!("/coins/{}/market_chart", id);
        let params = [
            ("vs_currency", "usd"),
            ("days", CHART_DAYS),
            ("interval", "hourly"),
        ];
        let url = build_url(PROVIDER_ID, &self.base_url, &path, &params)?;
        let text = get_text(&self.client, PROVIDER_ID, url, CHART_TIMEOUT, None).await?;

        let points = Self::parse_market_chart(&text)?;
        debug!(
            "CoinGecko: fetched {} points for {} ({})",
            points.len(),
            symbol,
            id
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COIN_LIST: &str = r#"[
        {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
        {"id": "batcoin", "symbol": "btc", "name": "Batcoin"},
        {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
    ]"#;

    #[test]
    fn test_parse_market_chart_rounds_to_minute() {
        // 2021-08-09 13:00:31.500 UTC
        let body = r#"{"prices": [[1628514031500, 45123.5], [1628517600000, 45200]]}"#;
        let points = CoinGeckoProvider::parse_market_chart(body).unwrap();
        assert_eq!(points.len(), 2);

        let expected = NaiveDate::from_ymd_opt(2021, 8, 9)
            .unwrap()
            .and_hms_opt(13, 1, 0)
            .unwrap();
        assert_eq!(points[0].time, expected);
        assert_eq!(points[0].price, dec!(45123.5));
        assert_eq!(points[1].price, dec!(45200));
    }

    #[test]
    fn test_parse_market_chart_rejects_garbage() {
        let result = CoinGeckoProvider::parse_market_chart("{\"error\": \"coin not found\"}");
        assert!(matches!(result, Err(MarketDataError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_resolve_id_is_case_insensitive_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COIN_LIST))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri());
        assert_eq!(provider.resolve_id("BTC").await.unwrap(), "bitcoin");
        assert_eq!(provider.resolve_id("eth").await.unwrap(), "ethereum");
        assert!(matches!(
            provider.resolve_id("doge").await,
            Err(MarketDataError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_series() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COIN_LIST))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/coins/ethereum/market_chart"))
            .and(query_param("vs_currency", "usd"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"prices": [[1628514000000, 3100.25]]}"#),
            )
            .mount(&server)
            .await;

        let provider = CoinGeckoProvider::with_base_url(server.uri());
        let points = provider.fetch_series("ETH").await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, dec!(3100.25));
    }
}
