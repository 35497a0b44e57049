use chrono::{NaiveDateTime, TimeDelta, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cached price at minute resolution.
///
/// Timestamps are timezone-naive and expressed in whatever local time the
/// provider reports. `price` is the close for equity bars; the remaining
/// OHLCV columns are only present for equities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Minute-resolution timestamp of the point
    pub time: NaiveDateTime,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Close/last price (required)
    pub price: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl PricePoint {
    /// Create a price-only point, rounding the time to the nearest minute.
    pub fn new(time: NaiveDateTime, price: Decimal) -> Self {
        Self {
            time: round_to_minute(time),
            open: None,
            high: None,
            low: None,
            price,
            volume: None,
        }
    }

    /// Create a full OHLCV point, rounding the time to the nearest minute.
    pub fn ohlcv(
        time: NaiveDateTime,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            time: round_to_minute(time),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            price: close,
            volume: Some(volume),
        }
    }
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(time)
}

/// Round to the nearest minute; 30 seconds and above round up.
pub fn round_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    let floor = truncate_to_minute(time);
    if time - floor >= TimeDelta::seconds(30) {
        floor + TimeDelta::minutes(1)
    } else {
        floor
    }
}
