//! Retry and backoff policy.
//!
//! Pure decisions only: whether a status warrants another attempt, and how
//! long to wait before it. The fetch orchestrator owns the loop and the
//! attempt counter.

mod backoff;
mod config;
mod policy;

pub use backoff::compute_delay;
pub use config::{
    BackoffType, ConfigError, RetryConfig, RetryOptions, DEFAULT_BACKOFF_SECS, DEFAULT_RETRIES,
};
pub use policy::{is_retriable_status, should_retry, RETRIABLE_STATUSES};
