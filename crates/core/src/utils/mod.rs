pub mod time_utils;

pub use time_utils::{ceil_to_minute, next_midnight, Clock, FixedClock, SystemClock};
