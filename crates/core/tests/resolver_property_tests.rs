//! Property-based tests for the series merge and the price resolver.
//!
//! These tests check the resolver against a direct range lookup over the
//! same points, using the `proptest` crate for random test case generation.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use rust_decimal::Decimal;

use pricetrail_core::{price_at, PriceSlot, SymbolSeries};
use pricetrail_market_data::{PricePoint, SeriesKind};

// =============================================================================
// Generators
// =============================================================================

const WINDOW_MINUTES: i64 = 10 * 24 * 60;

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 8, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn minute(offset: i64) -> NaiveDateTime {
    origin() + TimeDelta::minutes(offset)
}

/// Generates points at random minutes of a ten-day window, clustered into a
/// few trading hours so that whole days are often missing.
fn arb_points(max: usize) -> impl Strategy<Value = Vec<PricePoint>> {
    proptest::collection::vec((0i64..10, 540i64..960, 1i64..100_000), 0..=max).prop_map(
        |raw| {
            raw.into_iter()
                .map(|(day, minute_of_day, cents)| {
                    PricePoint::new(
                        minute(day * 1440 + minute_of_day),
                        Decimal::new(cents, 2),
                    )
                })
                .collect()
        },
    )
}

fn series(points: Vec<PricePoint>) -> SymbolSeries {
    SymbolSeries::with_points("TEST", SeriesKind::Equity, points)
}

/// First point at or after `target`, straight from the ordered points.
fn first_at_or_after(series: &SymbolSeries, target: NaiveDateTime) -> Option<&PricePoint> {
    series.iter_desc().filter(|p| p.time >= target).last()
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The resolver finds the first point in [target, ceiling], or nothing.
    #[test]
    fn prop_resolver_returns_first_point_at_or_after_target(
        points in arb_points(40),
        target_offset in -1440i64..(WINDOW_MINUTES + 1440),
    ) {
        let series = series(points);
        let target = minute(target_offset);

        let slot = price_at(&series, target);

        if series.len() < 2 {
            prop_assert_eq!(slot, PriceSlot::NotFound);
        } else {
            let expected = first_at_or_after(&series, target)
                .map_or(PriceSlot::NotFound, |p| PriceSlot::Price(p.price));
            prop_assert_eq!(slot, expected);
        }
    }

    /// A found price is never stamped before the target.
    #[test]
    fn prop_resolver_never_looks_backwards(
        points in arb_points(40),
        target_offset in 0i64..WINDOW_MINUTES,
    ) {
        let series = series(points);
        let target = minute(target_offset);

        if let PriceSlot::Price(price) = price_at(&series, target) {
            let stamped_at_or_after = series
                .iter_desc()
                .any(|p| p.price == price && p.time >= target);
            prop_assert!(stamped_at_or_after);
        }
    }

    /// Merging the same points twice changes nothing.
    #[test]
    fn prop_merge_is_idempotent(points in arb_points(40)) {
        let mut once = series(points.clone());
        let snapshot = once.clone();

        prop_assert_eq!(once.merge(points), 0);
        prop_assert_eq!(once, snapshot);
    }

    /// Merging never lowers the coverage ceiling nor drops a cached point.
    #[test]
    fn prop_merge_keeps_ceiling_and_cached_points(
        cached in arb_points(30),
        fetched in arb_points(30),
    ) {
        let mut merged = series(cached);
        let before = merged.clone();

        merged.merge(fetched);

        prop_assert!(merged.ceiling() >= before.ceiling());
        for point in before.iter_desc() {
            prop_assert_eq!(merged.get(&point.time), Some(point));
        }
    }
}
