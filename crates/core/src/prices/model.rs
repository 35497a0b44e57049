use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pricetrail_market_data::SeriesKind;

/// Outcome of one price lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSlot {
    Price(Decimal),
    NotFound,
}

impl PriceSlot {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Price(_))
    }
}

impl From<Option<Decimal>> for PriceSlot {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::NotFound, Self::Price)
    }
}

/// Prices around one alert: at the alert and at each fixed offset after it.
///
/// `current` is the live price slot. It is `Some` for equities only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTuple {
    pub alert: PriceSlot,
    pub two_hours: PriceSlot,
    pub four_hours: PriceSlot,
    pub one_day: PriceSlot,
    pub one_week: PriceSlot,
    pub current: Option<PriceSlot>,
}

impl PriceTuple {
    /// Build from the offset slots in order (alert, +2h, +4h, +1d, +1w).
    pub fn from_offsets(slots: [PriceSlot; 5], current: Option<PriceSlot>) -> Self {
        let [alert, two_hours, four_hours, one_day, one_week] = slots;
        Self {
            alert,
            two_hours,
            four_hours,
            one_day,
            one_week,
            current,
        }
    }

    /// Every slot `NotFound`, shaped for `kind`.
    pub fn not_found(kind: SeriesKind) -> Self {
        let current = match kind {
            SeriesKind::Equity => Some(PriceSlot::NotFound),
            SeriesKind::Crypto => None,
        };
        Self::from_offsets([PriceSlot::NotFound; 5], current)
    }

    /// The offset slots in order, without the live slot.
    pub fn offsets(&self) -> [PriceSlot; 5] {
        [
            self.alert,
            self.two_hours,
            self.four_hours,
            self.one_day,
            self.one_week,
        ]
    }

    pub fn is_all_not_found(&self) -> bool {
        self.offsets()
            .iter()
            .chain(self.current.iter())
            .all(|slot| !slot.is_found())
    }
}
