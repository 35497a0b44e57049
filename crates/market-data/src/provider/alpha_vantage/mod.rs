//! Alpha Vantage intraday provider.
//!
//! Serves minute bars for equities through the `TIME_SERIES_INTRADAY_EXTENDED`
//! endpoint, which answers with a CSV table (`time,open,high,low,close,volume`)
//! covering the most recent month.
//!
//! Note: Alpha Vantage throttles free keys at 5 calls per minute and 500 per
//! day. Throttling is not signalled by status code: the body carries a
//! "Thank you for using Alpha Vantage" notice instead of data.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::{build_client, build_url, get_text};
use crate::errors::MarketDataError;
use crate::models::PricePoint;
use crate::provider::KeyedSeriesProvider;

const BASE_URL: &str = "https://www.alphavantage.co";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Most recent 30-day slice of the extended intraday history.
const DEFAULT_SLICE: &str = "year1month1";

/// Substring present in every throttled response body.
pub const RATE_LIMIT_MARKER: &str = "Thank you for using Alpha Vantage";

/// Whether a response body is a throttling notice rather than data.
pub fn is_rate_limited(body: &str) -> bool {
    body.contains(RATE_LIMIT_MARKER)
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// JSON body returned instead of CSV when the call fails.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// One CSV row of TIME_SERIES_INTRADAY_EXTENDED.
#[derive(Debug, Deserialize)]
struct IntradayRow {
    time: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

/// Alpha Vantage intraday equity provider.
///
/// The API key is supplied per call so a single provider can be driven by a
/// rotating key pool.
pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    slice: String,
}

impl AlphaVantageProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at another host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(REQUEST_TIMEOUT),
            base_url: base_url.into(),
            slice: DEFAULT_SLICE.to_string(),
        }
    }

    /// Check for API-level errors in a JSON response.
    fn check_api_error(response: &ErrorResponse) -> Result<(), MarketDataError> {
        if let Some(ref msg) = response.error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        for msg in [&response.note, &response.information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage notice: {}", msg);
        }

        Ok(())
    }

    fn parse_time(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .ok()
    }

    fn parse_decimal(s: &str) -> Option<Decimal> {
        Decimal::from_str(s).ok()
    }

    /// Parse the intraday CSV table into price points, skipping bad rows.
    fn parse_intraday_csv(symbol: &str, body: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let parse_error = |message: String| MarketDataError::Parse {
            provider: PROVIDER_ID.to_string(),
            message,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| parse_error(format!("Unreadable CSV header: {}", e)))?;
        if !headers.iter().any(|h| h == "time") {
            return Err(parse_error(format!(
                "Unexpected CSV header for {}: {:?}",
                symbol, headers
            )));
        }

        let mut skipped = 0usize;
        let points: Vec<PricePoint> = reader
            .deserialize::<IntradayRow>()
            .filter_map(|row| {
                let parsed = row.ok().and_then(|row| {
                    Some(PricePoint::ohlcv(
                        Self::parse_time(&row.time)?,
                        Self::parse_decimal(&row.open)?,
                        Self::parse_decimal(&row.high)?,
                        Self::parse_decimal(&row.low)?,
                        Self::parse_decimal(&row.close)?,
                        Self::parse_decimal(&row.volume)?,
                    ))
                });
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        if skipped > 0 {
            warn!("Alpha Vantage: skipped {} malformed rows for {}", skipped, symbol);
        }

        Ok(points)
    }
}

impl Default for AlphaVantageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyedSeriesProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        api_key: &str,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let params = [
            ("function", "TIME_SERIES_INTRADAY_EXTENDED"),
            ("symbol", symbol),
            ("interval", "1min"),
            ("slice", self.slice.as_str()),
            ("apikey", api_key),
        ];
        let url = build_url(PROVIDER_ID, &self.base_url, "/query", &params)?;
        let text = get_text(&self.client, PROVIDER_ID, url, REQUEST_TIMEOUT, Some(api_key)).await?;

        if is_rate_limited(&text) {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if text.trim_start().starts_with('{') {
            let response: ErrorResponse = serde_json::from_str(&text).unwrap_or_default();
            Self::check_api_error(&response)?;
            return Err(MarketDataError::SymbolNotFound(format!(
                "No intraday data for symbol: {}",
                symbol
            )));
        }

        let points = Self::parse_intraday_csv(symbol, &text)?;
        debug!(
            "Alpha Vantage: fetched {} intraday points for {}",
            points.len(),
            symbol
        );
        Ok(points)
    }
}
