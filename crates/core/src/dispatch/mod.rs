//! Batch classification and source fallback.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info};

use pricetrail_market_data::{CoinListing, SeriesKind};

use crate::constants::{CLASSIFICATION_WINDOW, CRYPTO_MAJORITY};
use crate::prices::{PriceSource, PriceTuple};

/// Lower-cased ticker symbols of every known cryptocurrency.
#[derive(Clone, Debug, Default)]
pub struct CryptoUniverse {
    symbols: HashSet<String>,
}

impl CryptoUniverse {
    pub fn from_listings(listings: &[CoinListing]) -> Self {
        listings.iter().map(|coin| coin.symbol.as_str()).collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(&normalize(symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for CryptoUniverse {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(normalize).collect(),
        }
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().trim_start_matches('$').to_lowercase()
}

/// Label a batch as crypto- or equity-leaning.
///
/// Looks at the first ten distinct symbols in order and counts those found in
/// `universe`. Seven or more hits make the batch crypto.
pub fn classify<S: AsRef<str>>(symbols: &[S], universe: &CryptoUniverse) -> SeriesKind {
    let mut seen = HashSet::new();
    let mut hits = 0;

    for symbol in symbols {
        let key = normalize(symbol.as_ref());
        if !seen.insert(key.clone()) {
            continue;
        }
        if universe.contains(&key) {
            hits += 1;
        }
        if seen.len() >= CLASSIFICATION_WINDOW {
            break;
        }
    }

    let kind = if hits >= CRYPTO_MAJORITY {
        SeriesKind::Crypto
    } else {
        SeriesKind::Equity
    };
    debug!(
        "Batch classified {} ({} of {} distinct symbols are crypto)",
        kind,
        hits,
        seen.len()
    );
    kind
}

/// Routes lookups to the preferred source, falling back to the other one.
pub struct SourceDispatcher {
    equity: Arc<dyn PriceSource>,
    crypto: Arc<dyn PriceSource>,
}

impl SourceDispatcher {
    pub fn new(equity: Arc<dyn PriceSource>, crypto: Arc<dyn PriceSource>) -> Self {
        Self { equity, crypto }
    }

    fn source(&self, kind: SeriesKind) -> &Arc<dyn PriceSource> {
        match kind {
            SeriesKind::Equity => &self.equity,
            SeriesKind::Crypto => &self.crypto,
        }
    }

    /// Resolve `symbol` at `time` against `preferred`, then the other source
    /// if every slot came back `NotFound`.
    pub async fn resolve(
        &self,
        preferred: SeriesKind,
        symbol: &str,
        time: NaiveDateTime,
    ) -> PriceTuple {
        let first = self.source(preferred).get_prices(symbol, time).await;
        if !first.is_all_not_found() {
            return first;
        }

        let fallback = preferred.other();
        info!(
            "{}: nothing from the {} source, trying {}",
            symbol, preferred, fallback
        );
        self.source(fallback).get_prices(symbol, time).await
    }
}
