//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every provider call
//! - [`RetryClass`]: Classification used by the fetchers to decide whether to retry

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to an upstream price provider.
///
/// Providers return these; the fetchers in [`crate::fetcher`] consume them and
/// never let them escape. Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class).
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider does not know the requested symbol.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider throttled the request (marker in the body or HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// Transport-level failure (connection refused, reset, DNS, ...).
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The provider being called
        provider: String,
        /// The underlying transport error
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        /// The provider whose payload was malformed
        provider: String,
        /// Description of the parse failure
        message: String,
    },

    /// Every credential in the pool has used up its budget.
    #[error("Credentials exhausted: {provider}")]
    CredentialsExhausted {
        /// The provider whose pool is exhausted
        provider: String,
    },
}

impl MarketDataError {
    /// Maps a reqwest transport error onto the crate taxonomy.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network {
                provider: provider.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::WithBackoff`]: throttling, timeouts and transport or
    ///   server failures; the fetcher sleeps and tries again
    /// - [`RetryClass::Never`]: the request itself is bad or the quota is gone
    ///
    /// # Examples
    ///
    /// ```
    /// use pricetrail_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("ZZZZ".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::Network { .. }
            | Self::ProviderError { .. } => RetryClass::WithBackoff,

            Self::SymbolNotFound(_) | Self::Parse { .. } | Self::CredentialsExhausted { .. } => {
                RetryClass::Never
            }
        }
    }
}
