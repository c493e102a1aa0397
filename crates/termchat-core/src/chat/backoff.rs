//! Exponential backoff schedule.
//!
//! Stateless, like the other policy helpers: the delay is derived from the
//! retry counter on every failure and never stored.

use std::time::Duration;

use termchat_types::config::RetryConfig;

/// Delay to wait before retry number `retry` (zero-based):
/// `initial_delay * 2^retry`, saturating at `Duration::MAX`.
pub fn delay_for(initial_delay: Duration, retry: u32) -> Duration {
    if initial_delay.is_zero() {
        return Duration::ZERO;
    }
    2u128
        .checked_pow(retry)
        .and_then(|factor| initial_delay.as_nanos().checked_mul(factor))
        .and_then(from_nanos_u128)
        .unwrap_or(Duration::MAX)
}

fn from_nanos_u128(nanos: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, subsec))
}

/// Whole milliseconds in `delay`, clamped to `u64::MAX` for saturated delays.
pub fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Whether a request that has already failed on `attempt` (zero-based)
/// may be sent again.
pub fn should_retry(config: &RetryConfig, attempt: u32) -> bool {
    attempt < config.max_retries
}
