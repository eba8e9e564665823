//! Delay between a failed attempt and the next retry.

use super::config::{BackoffType, RetryConfig};
use std::time::Duration;

/// Delay to wait before the next retry.
///
/// `attempts_so_far` is the number of retries already performed, so the
/// first retry uses exponent 0 and waits exactly the base. The result is
/// not clamped unless the config carries a `max_delay`; arithmetic
/// saturates at `Duration::MAX` instead of overflowing.
pub fn compute_delay(config: &RetryConfig, attempts_so_far: u32) -> Duration {
    let base = config.backoff_base();
    let raw = match config.backoff_type() {
        BackoffType::Fixed => base,
        BackoffType::Exponential => 1u32
            .checked_shl(attempts_so_far)
            .and_then(|factor| base.checked_mul(factor))
            .unwrap_or(Duration::MAX),
    };
    match config.max_delay() {
        Some(max) => raw.min(max),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(kind: BackoffType, base: Duration) -> RetryConfig {
        RetryConfig::new(10, base, kind).unwrap()
    }

    #[test]
    fn fixed_is_constant() {
        let c = cfg(BackoffType::Fixed, Duration::from_secs(2));
        for attempt in [0, 1, 2, 5, 31, 32, u32::MAX] {
            assert_eq!(compute_delay(&c, attempt), Duration::from_secs(2));
            assert_eq!(compute_delay(&c, attempt), compute_delay(&c, attempt));
        }
    }

    #[test]
    fn exponential_doubles_from_base() {
        let c = cfg(BackoffType::Exponential, Duration::from_millis(500));
        assert_eq!(compute_delay(&c, 0), Duration::from_millis(500));
        assert_eq!(compute_delay(&c, 1), Duration::from_secs(1));
        assert_eq!(compute_delay(&c, 2), Duration::from_secs(2));
        assert_eq!(compute_delay(&c, 3), Duration::from_secs(4));
    }

    #[test]
    fn exponential_strictly_increases_until_saturation() {
        let c = cfg(BackoffType::Exponential, Duration::from_secs(1));
        let mut prev = compute_delay(&c, 0);
        for attempt in 1..31 {
            let d = compute_delay(&c, attempt);
            assert!(d > prev, "attempt {}", attempt);
            prev = d;
        }
    }

    #[test]
    fn exponential_saturates_instead_of_overflowing() {
        let c = cfg(BackoffType::Exponential, Duration::from_secs(u64::MAX / 2));
        assert_eq!(compute_delay(&c, 4), Duration::MAX);
        let c = cfg(BackoffType::Exponential, Duration::from_secs(1));
        assert_eq!(compute_delay(&c, 32), Duration::MAX);
        assert_eq!(compute_delay(&c, u32::MAX), Duration::MAX);
    }

    #[test]
    fn max_delay_caps_result() {
        let c = cfg(BackoffType::Exponential, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5));
        assert_eq!(compute_delay(&c, 0), Duration::from_secs(1));
        assert_eq!(compute_delay(&c, 2), Duration::from_secs(4));
        assert_eq!(compute_delay(&c, 3), Duration::from_secs(5));
        assert_eq!(compute_delay(&c, 100), Duration::from_secs(5));
    }
}
