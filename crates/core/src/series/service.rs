//! The per-symbol series cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use tokio::sync::Mutex as AsyncMutex;

use pricetrail_market_data::{LivePriceFetcher, SeriesFetcher, SeriesKind};

use super::model::SymbolSeries;
use super::store::SeriesRepository;
use crate::errors::{Result, StorageError};
use crate::utils::Clock;

/// Cache slot of one symbol.
struct CachedSeries {
    series: Arc<SymbolSeries>,
    last_refresh: Option<NaiveDate>,
}

type Slot = Arc<AsyncMutex<CachedSeries>>;

/// Owns every cached series of one kind and keeps them fresh.
///
/// Each symbol sits behind its own async lock, so two refreshes of the same
/// symbol never overlap while different symbols proceed independently.
/// Readers get an immutable snapshot; a refresh swaps in a new one.
pub struct SymbolSeriesStore {
    kind: SeriesKind,
    repository: Arc<dyn SeriesRepository>,
    fetcher: Arc<dyn SeriesFetcher>,
    live: Option<Arc<dyn LivePriceFetcher>>,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SymbolSeriesStore {
    pub fn new(
        kind: SeriesKind,
        repository: Arc<dyn SeriesRepository>,
        fetcher: Arc<dyn SeriesFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            kind,
            repository,
            fetcher,
            live: None,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Attach the live quote source used for the current-price slot.
    pub fn with_live_prices(mut self, live: Arc<dyn LivePriceFetcher>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub(crate) fn live(&self) -> Option<&Arc<dyn LivePriceFetcher>> {
        self.live.as_ref()
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| {
            warn!("Series store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn slot(&self, symbol: &str) -> Slot {
        self.lock_slots()
            .entry(symbol.to_string())
            .or_insert_with(|| {
                Arc::new(AsyncMutex::new(CachedSeries {
                    series: Arc::new(SymbolSeries::new(symbol, self.kind)),
                    last_refresh: None,
                }))
            })
            .clone()
    }

    /// Replace the cache with everything the repository holds.
    ///
    /// Returns the number of series loaded.
    pub fn load(&self) -> Result<usize> {
        let loaded = self.repository.load_all()?;
        let count = loaded.len();

        let mut slots = self.lock_slots();
        slots.clear();
        for series in loaded {
            let symbol = series.symbol().to_string();
            slots.insert(
                symbol,
                Arc::new(AsyncMutex::new(CachedSeries {
                    series: Arc::new(series),
                    last_refresh: None,
                })),
            );
        }
        info!("{} store: loaded {} series", self.kind, count);
        Ok(count)
    }

    /// Return the series for `symbol`, refreshing it first when stale.
    ///
    /// A symbol is refreshed at most once per calendar day. Fetched points are
    /// merged under the cached ones and the result is persisted right away.
    /// Fetch or persistence failures leave the previous series in place.
    pub async fn ensure_fresh(&self, symbol: &str) -> Arc<SymbolSeries> {
        let symbol = self.kind.normalize_symbol(symbol);
        let slot = self.slot(&symbol);
        let mut cached = slot.lock().await;

        let today = self.clock.today();
        if !cached.series.is_stale(today) {
            return cached.series.clone();
        }
        if cached.last_refresh == Some(today) {
            debug!("{}: already refreshed today", symbol);
            return cached.series.clone();
        }
        cached.last_refresh = Some(today);

        debug!("{}: new download from {}", symbol, self.fetcher.id());
        let Some(points) = self.fetcher.fetch(&symbol).await else {
            warn!("{}: no data from {}", symbol, self.fetcher.id());
            return cached.series.clone();
        };

        let previous_ceiling = cached.series.ceiling();
        let mut merged = (*cached.series).clone();
        let added = merged.merge(points);
        if merged.is_empty() {
            return cached.series.clone();
        }
        if added == 0 && previous_ceiling.is_some() {
            debug!("{}: download added nothing new", symbol);
            return cached.series.clone();
        }

        if let Err(e) = self.repository.save(&merged) {
            error!("{}: failed to persist refreshed series: {}", symbol, e);
        }
        info!(
            "{}: merged {} new points (ceiling {:?} -> {:?})",
            symbol,
            added,
            previous_ceiling,
            merged.ceiling()
        );

        cached.series = Arc::new(merged);
        cached.series.clone()
    }

    /// Persist every non-empty series.
    ///
    /// Failures are logged per symbol and do not stop the remaining writes.
    /// Returns the number of series written.
    pub async fn save(&self) -> Result<usize> {
        let slots: Vec<Slot> = self.lock_slots().values().cloned().collect();

        let mut saved = 0;
        let mut failed = 0;
        for slot in &slots {
            let series = slot.lock().await.series.clone();
            if series.is_empty() {
                continue;
            }
            match self.repository.save(&series) {
                Ok(()) => saved += 1,
                Err(e) => {
                    error!("{}: failed to save: {}", series.symbol(), e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(StorageError::SaveFailed {
                failed,
                total: saved + failed,
            }
            .into());
        }
        info!("{} store: saved {} series", self.kind, saved);
        Ok(saved)
    }
}
