//! Plain GET helper shared by the HTTP providers.

use std::str::FromStr;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;

/// Build a client with a default timeout, falling back to reqwest defaults.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Build `base` + `path` with query parameters.
pub(crate) fn build_url(
    provider: &str,
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, MarketDataError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    let parsed = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|e| MarketDataError::ProviderError {
        provider: provider.to_string(),
        message: format!("Failed to build URL: {}", e),
    })
}

/// Issue a GET and return the body text of a successful response.
///
/// `secret`, when given, is masked in the logged URL.
pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: Url,
    timeout: Duration,
    secret: Option<&str>,
) -> Result<String, MarketDataError> {
    let logged = match secret {
        Some(secret) if !secret.is_empty() => url.as_str().replace(secret, "***"),
        _ => url.as_str().to_string(),
    };
    debug!("{} request: {}", provider, logged);

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::RateLimited {
            provider: provider.to_string(),
        });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(MarketDataError::SymbolNotFound(logged));
    }
    if !status.is_success() {
        return Err(MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    response
        .text()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))
}

/// Exact decimal from a JSON number, accepting exponent notation.
pub(crate) fn number_to_decimal(number: &serde_json::Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
