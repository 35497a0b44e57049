use serde::{Deserialize, Serialize};

/// One entry of the CoinGecko `/coins/list` universe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinListing {
    /// Provider-internal identifier used in chart requests (e.g. "bitcoin").
    pub id: String,
    /// Ticker-like symbol (e.g. "btc"). Not unique across listings.
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CoinListing {
    pub fn matches(&self, symbol: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol)
    }
}
