use chrono::TimeDelta;

/// Timestamp layout of persisted series files and alert input.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offsets from the alert time at which prices are resolved, in slot order.
pub const PRICE_OFFSETS: [TimeDelta; 5] = [
    TimeDelta::zero(),
    TimeDelta::hours(2),
    TimeDelta::hours(4),
    TimeDelta::days(1),
    TimeDelta::days(7),
];

/// Number of leading distinct symbols a batch is classified on.
pub const CLASSIFICATION_WINDOW: usize = 10;

/// Minimum crypto hits within the window for a batch to lean crypto.
pub const CRYPTO_MAJORITY: usize = 7;
