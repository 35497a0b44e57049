//! Fixed-delay retry loop shared by the fetchers.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{MarketDataError, RetryClass};

/// Attempts allowed for one logical fetch, for every provider kind.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Pause between attempts against a throttled provider.
pub const RATE_LIMITED_DELAY: Duration = Duration::from_secs(15);

/// Pause between attempts after a transient network failure.
pub const TRANSIENT_DELAY: Duration = Duration::from_secs(5);

/// How many times to try and how long to wait in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// 5 attempts, 15 s apart: the throttled time-series provider.
    pub const fn rate_limited() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: RATE_LIMITED_DELAY,
        }
    }

    /// 5 attempts, 5 s apart: the simple list/lookup providers.
    pub const fn transient() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: TRANSIENT_DELAY,
        }
    }

    /// No pause between attempts.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Run `op` until it succeeds, fails terminally, or the attempt budget is spent.
///
/// `op` receives the 1-based attempt number. Returns `None` on any failure;
/// the error never reaches the caller.
pub async fn with_retry<T, F, Fut>(
    provider: &str,
    symbol: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Option<T>
where
    F: FnMut(u32) -> Fut + Send,
    Fut: Future<Output = Result<T, MarketDataError>> + Send,
    T: Send,
{
    for attempt in 1..=policy.max_attempts {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: {} succeeded on attempt {}", provider, symbol, attempt);
                }
                return Some(value);
            }
            Err(e) => match e.retry_class() {
                RetryClass::Never => {
                    warn!("{}: giving up on {}: {}", provider, symbol, e);
                    return None;
                }
                RetryClass::WithBackoff => {
                    warn!(
                        "{}: no usable response for {} ({}). Retrying {}/{}..",
                        provider, symbol, e, attempt, policy.max_attempts
                    );
                    if attempt < policy.max_attempts && !policy.delay.is_zero() {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
            },
        }
    }

    warn!(
        "{}: no response for {} after {} attempts",
        provider, symbol, policy.max_attempts
    );
    None
}
