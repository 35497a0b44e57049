use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use pricetrail_market_data::truncate_to_minute;

/// Source of "today" for staleness decisions.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Midnight of the day after `time`, or `None` at the end of the calendar.
pub fn next_midnight(time: NaiveDateTime) -> Option<NaiveDateTime> {
    time.date()
        .succ_opt()
        .map(|day| day.and_time(NaiveTime::MIN))
}

/// The first whole minute at or after `time`.
pub fn ceil_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    let floor = truncate_to_minute(time);
    if floor < time {
        floor + TimeDelta::minutes(1)
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_next_midnight() {
        assert_eq!(next_midnight(at(9, 13, 50, 0)), Some(at(10, 0, 0, 0)));
        assert_eq!(next_midnight(at(9, 0, 0, 0)), Some(at(10, 0, 0, 0)));
    }

    #[test]
    fn test_ceil_to_minute() {
        assert_eq!(ceil_to_minute(at(9, 13, 50, 0)), at(9, 13, 50, 0));
        assert_eq!(ceil_to_minute(at(9, 13, 50, 1)), at(9, 13, 51, 0));
    }
}
