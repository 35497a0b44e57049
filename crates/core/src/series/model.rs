//! Domain model for a cached per-symbol time series.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use pricetrail_market_data::{round_to_minute, PricePoint, SeriesKind};

/// The cached price history of one symbol.
///
/// Holds at most one point per minute. Points are keyed by timestamp, so the
/// latest point (the coverage ceiling) is always the last key and descending
/// order is a reverse walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSeries {
    symbol: String,
    kind: SeriesKind,
    points: BTreeMap<NaiveDateTime, PricePoint>,
}

impl SymbolSeries {
    /// An empty series. `symbol` is stored as given; callers normalize it.
    pub fn new(symbol: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            points: BTreeMap::new(),
        }
    }

    pub fn with_points<I>(symbol: impl Into<String>, kind: SeriesKind, points: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut series = Self::new(symbol, kind);
        series.merge(points);
        series
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    /// Union `points` into the series and return how many were new.
    ///
    /// Timestamps are rounded to the minute first. On a timestamp collision
    /// the point already held wins, including collisions within `points`.
    pub fn merge<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut added = 0;
        for mut point in points {
            point.time = round_to_minute(point.time);
            if let Entry::Vacant(slot) = self.points.entry(point.time) {
                slot.insert(point);
                added += 1;
            }
        }
        added
    }

    /// Latest timestamp present.
    pub fn ceiling(&self) -> Option<NaiveDateTime> {
        self.points.keys().next_back().copied()
    }

    /// Calendar dates with at least one point.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.points.keys().map(|t| t.date()).collect()
    }

    pub fn get(&self, time: &NaiveDateTime) -> Option<&PricePoint> {
        self.points.get(time)
    }

    /// Points from newest to oldest.
    pub fn iter_desc(&self) -> impl Iterator<Item = &PricePoint> + '_ {
        self.points.values().rev()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the series needs a refresh as of `today`.
    ///
    /// Empty series are always stale. Otherwise the series is stale once its
    /// ceiling falls before yesterday.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        match (self.ceiling(), today.pred_opt()) {
            (None, _) => true,
            (Some(ceiling), Some(yesterday)) => ceiling.date() < yesterday,
            (Some(_), None) => false,
        }
    }
}
