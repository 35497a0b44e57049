//! Point-in-time price lookup over a cached series.

use chrono::{NaiveDateTime, TimeDelta};

use super::model::PriceSlot;
use crate::series::SymbolSeries;
use crate::utils::{ceil_to_minute, next_midnight};

/// Price at `target`, or the first price after it.
///
/// Scans forward a minute at a time from `target`. Days with no data at all
/// are skipped whole by jumping to the next midnight. The scan stops with
/// [`PriceSlot::NotFound`] once it passes the coverage ceiling, so the
/// returned price is never stamped before `target` nor after the ceiling.
///
/// Series with fewer than two points are treated as having no data.
pub fn price_at(series: &SymbolSeries, target: NaiveDateTime) -> PriceSlot {
    if series.len() < 2 {
        return PriceSlot::NotFound;
    }
    let Some(ceiling) = series.ceiling() else {
        return PriceSlot::NotFound;
    };
    let available_dates = series.dates();

    let mut cursor = ceil_to_minute(target);
    loop {
        if let Some(point) = series.get(&cursor) {
            return PriceSlot::Price(point.price);
        }
        if cursor > ceiling {
            return PriceSlot::NotFound;
        }
        cursor = if available_dates.contains(&cursor.date()) {
            cursor + TimeDelta::minutes(1)
        } else {
            match next_midnight(cursor) {
                Some(next) => next,
                None => return PriceSlot::NotFound,
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pricetrail_market_data::{PricePoint, SeriesKind};
    use rust_decimal_macros::dec;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn series(points: &[(NaiveDateTime, rust_decimal::Decimal)]) -> SymbolSeries {
        SymbolSeries::with_points(
            "TEST",
            SeriesKind::Equity,
            points.iter().map(|(t, p)| PricePoint::new(*t, *p)),
        )
    }

    #[test]
    fn test_exact_match() {
        let s = series(&[(at(9, 13, 50), dec!(10)), (at(9, 15, 0), dec!(11))]);
        assert_eq!(price_at(&s, at(9, 13, 50)), PriceSlot::Price(dec!(10)));
    }

    #[test]
    fn test_scans_forward_within_day() {
        let s = series(&[(at(9, 13, 50), dec!(10)), (at(9, 15, 0), dec!(11))]);
        assert_eq!(price_at(&s, at(9, 13, 51)), PriceSlot::Price(dec!(11)));
    }

    #[test]
    fn test_skips_missing_days() {
        // Friday close, then Monday open.
        let s = series(&[(at(6, 20, 0), dec!(10)), (at(9, 4, 0), dec!(12))]);
        assert_eq!(price_at(&s, at(7, 13, 50)), PriceSlot::Price(dec!(12)));
    }

    #[test]
    fn test_beyond_ceiling_is_not_found() {
        let s = series(&[(at(6, 20, 0), dec!(10)), (at(9, 4, 0), dec!(12))]);
        assert_eq!(price_at(&s, at(9, 4, 1)), PriceSlot::NotFound);
        assert_eq!(price_at(&s, at(16, 4, 0)), PriceSlot::NotFound);
    }

    #[test]
    fn test_too_few_points() {
        let s = series(&[(at(9, 13, 50), dec!(10))]);
        assert_eq!(price_at(&s, at(9, 13, 50)), PriceSlot::NotFound);
        assert_eq!(price_at(&series(&[]), at(9, 13, 50)), PriceSlot::NotFound);
    }

    #[test]
    fn test_seconds_in_target_round_up() {
        let s = series(&[(at(9, 13, 50), dec!(10)), (at(9, 13, 51), dec!(11))]);
        let target = at(9, 13, 50) + TimeDelta::seconds(20);
        assert_eq!(price_at(&s, target), PriceSlot::Price(dec!(11)));
    }

    #[test]
    fn test_gap_rest_of_day_then_next_day() {
        let t0 = at(9, 13, 50);
        let s = series(&[
            (t0, dec!(10)),
            (t0 + TimeDelta::minutes(1), dec!(11)),
            (t0 + TimeDelta::days(1), dec!(12)),
        ]);

        assert_eq!(
            price_at(&s, t0 + TimeDelta::minutes(30)),
            PriceSlot::Price(dec!(12))
        );
        assert_eq!(price_at(&s, t0 + TimeDelta::days(2)), PriceSlot::NotFound);
    }
}
