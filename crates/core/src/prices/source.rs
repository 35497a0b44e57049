use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;

use pricetrail_market_data::{truncate_to_minute, SeriesKind};

use super::model::{PriceSlot, PriceTuple};
use super::resolver::price_at;
use crate::constants::PRICE_OFFSETS;
use crate::series::SymbolSeriesStore;

/// Something that can answer "what did this symbol cost around this alert".
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn kind(&self) -> SeriesKind;

    /// Prices at `alert_time` (truncated to the minute) and at each offset.
    async fn get_prices(&self, symbol: &str, alert_time: NaiveDateTime) -> PriceTuple;
}

#[async_trait]
impl PriceSource for SymbolSeriesStore {
    fn kind(&self) -> SeriesKind {
        SymbolSeriesStore::kind(self)
    }

    async fn get_prices(&self, symbol: &str, alert_time: NaiveDateTime) -> PriceTuple {
        let alert_time = truncate_to_minute(alert_time);
        let series = self.ensure_fresh(symbol).await;
        let kind = SymbolSeriesStore::kind(self);

        if series.is_empty() {
            debug!("{}: empty series, nothing to resolve", series.symbol());
            return PriceTuple::not_found(kind);
        }

        let slots = PRICE_OFFSETS.map(|offset| price_at(&series, alert_time + offset));

        let current = match kind {
            SeriesKind::Crypto => None,
            SeriesKind::Equity => Some(match self.live() {
                Some(live) => PriceSlot::from(live.latest_price(series.symbol()).await),
                None => PriceSlot::NotFound,
            }),
        };

        PriceTuple::from_offsets(slots, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{SeriesRepository, SymbolSeries};
    use crate::utils::FixedClock;
    use chrono::{NaiveDate, TimeDelta};
    use pricetrail_market_data::{LivePriceFetcher, PricePoint, SeriesFetcher};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    struct FixedFetcher(Vec<PricePoint>);

    #[async_trait]
    impl SeriesFetcher for FixedFetcher {
        fn id(&self) -> &'static str {
            "FIXED"
        }

        async fn fetch(&self, _symbol: &str) -> Option<Vec<PricePoint>> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.clone())
            }
        }
    }

    struct MockLive {
        calls: AtomicUsize,
        price: Option<Decimal>,
    }

    impl MockLive {
        fn quoting(price: Option<Decimal>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                price,
            })
        }
    }

    #[async_trait]
    impl LivePriceFetcher for MockLive {
        fn id(&self) -> &'static str {
            "MOCK_LIVE"
        }

        async fn latest_price(&self, _symbol: &str) -> Option<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
        }
    }

    struct NullRepository;

    impl SeriesRepository for NullRepository {
        fn load_all(&self) -> crate::Result<Vec<SymbolSeries>> {
            Ok(Vec::new())
        }

        fn save(&self, _series: &SymbolSeries) -> crate::Result<()> {
            Ok(())
        }
    }

    fn equity_store(points: Vec<PricePoint>, live: Arc<MockLive>) -> SymbolSeriesStore {
        SymbolSeriesStore::new(
            SeriesKind::Equity,
            Arc::new(NullRepository),
            Arc::new(FixedFetcher(points)),
            Arc::new(FixedClock(NaiveDate::from_ymd_opt(2021, 8, 17).unwrap())),
        )
        .with_live_prices(live)
    }

    #[tokio::test]
    async fn test_end_to_end_equity_prices() {
        // Minute bars every minute of 13:50..=13:55 on the 9th, plus 15:50 and
        // 17:50 that day, a 10th-morning bar and one a week later.
        let mut points: Vec<PricePoint> = (0..6)
            .map(|m| PricePoint::new(at(9, 13, 50 + m), Decimal::from(100 + m)))
            .collect();
        points.push(PricePoint::new(at(9, 15, 50), dec!(110)));
        points.push(PricePoint::new(at(9, 17, 55), dec!(120)));
        points.push(PricePoint::new(at(10, 9, 30), dec!(130)));
        points.push(PricePoint::new(at(16, 13, 50), dec!(140)));

        let live = MockLive::quoting(Some(dec!(150)));
        let store = equity_store(points, live.clone());

        let alert_time = at(9, 13, 50) + TimeDelta::seconds(33);
        let tuple = store.get_prices("cohn", alert_time).await;

        assert_eq!(tuple.alert, PriceSlot::Price(dec!(100)));
        assert_eq!(tuple.two_hours, PriceSlot::Price(dec!(110)));
        assert_eq!(tuple.four_hours, PriceSlot::Price(dec!(120)));
        assert_eq!(tuple.one_day, PriceSlot::Price(dec!(140)));
        assert_eq!(tuple.one_week, PriceSlot::Price(dec!(140)));
        assert_eq!(tuple.current, Some(PriceSlot::Price(dec!(150))));
        assert_eq!(live.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_equity_series_skips_live_call() {
        let live = MockLive::quoting(Some(dec!(150)));
        let store = equity_store(Vec::new(), live.clone());

        let tuple = store.get_prices("NOPE", at(9, 13, 50)).await;

        assert_eq!(tuple, PriceTuple::not_found(SeriesKind::Equity));
        assert_eq!(live.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_live_quote_only_clears_current_slot() {
        let points: Vec<PricePoint> = [
            (at(9, 13, 50), dec!(100)),
            (at(9, 15, 50), dec!(110)),
            (at(9, 17, 50), dec!(120)),
            (at(10, 13, 50), dec!(130)),
            (at(16, 13, 50), dec!(140)),
        ]
        .into_iter()
        .map(|(t, p)| PricePoint::new(t, p))
        .collect();
        let live = MockLive::quoting(None);
        let store = equity_store(points, live.clone());

        let tuple = store.get_prices("COHN", at(9, 13, 50)).await;

        assert_eq!(
            tuple.offsets(),
            [
                PriceSlot::Price(dec!(100)),
                PriceSlot::Price(dec!(110)),
                PriceSlot::Price(dec!(120)),
                PriceSlot::Price(dec!(130)),
                PriceSlot::Price(dec!(140)),
            ]
        );
        assert_eq!(tuple.current, Some(PriceSlot::NotFound));
        assert_eq!(live.calls.load(Ordering::SeqCst), 1);
    }
}
