use super::config::RetryConfig;

/// Server-side statuses treated as transient.
pub const RETRIABLE_STATUSES: [u16; 5] = [500, 501, 502, 503, 504];

/// True if `status` is one of the transient server-side codes.
pub fn is_retriable_status(status: u16) -> bool {
    RETRIABLE_STATUSES.contains(&status)
}

/// Decide whether another attempt is warranted after `status`.
///
/// `attempts_so_far` counts retries already consumed (0 before the first
/// retry). Only HTTP statuses are considered here; transport errors are
/// terminal and never reach this function.
pub fn should_retry(config: &RetryConfig, attempts_so_far: u32, status: u16) -> bool {
    is_retriable_status(status) && attempts_so_far < config.max_retries()
}
