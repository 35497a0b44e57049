//! IEX Cloud live quote provider.
//!
//! Used only for the "current price" of an equity. The quote endpoint returns
//! a large JSON object; the price is read from its `iexClose` field.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::http::{build_client, build_url, get_text, number_to_decimal};
use crate::errors::MarketDataError;
use crate::provider::LiveQuoteProvider;

const BASE_URL: &str = "https://cloud.iexapis.com/stable";
const PROVIDER_ID: &str = "IEX_CLOUD";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    iex_close: Option<serde_json::Number>,
}

/// IEX Cloud quote provider, authenticated with a single access token.
pub struct IexCloudProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl IexCloudProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(BASE_URL, token)
    }

    /// Point the provider at another host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: build_client(REQUEST_TIMEOUT),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn parse_quote(symbol: &str, body: &str) -> Result<Decimal, MarketDataError> {
        let response: QuoteResponse =
            serde_json::from_str(body).map_err(|e| MarketDataError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote: {}", e),
            })?;

        response
            .iex_close
            .as_ref()
            .and_then(number_to_decimal)
            .ok_or_else(|| MarketDataError::SymbolNotFound(format!("No live price for {}", symbol)))
    }
}

#[async_trait]
impl LiveQuoteProvider for IexCloudProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        let path = format!("/stock/{}/quote", symbol);
        let url = build_url(
            PROVIDER_ID,
            &self.base_url,
            &path,
            &[("token", self.token.as_str())],
        )?;
        let text = get_text(
            &self.client,
            PROVIDER_ID,
            url,
            REQUEST_TIMEOUT,
            Some(&self.token),
        )
        .await?;

        let price = Self::parse_quote(symbol, &text)?;
        debug!("IEX Cloud: live price for {} is {}", symbol, price);
        Ok(price)
    }
}
