//! rfetch core: HTTP GET with status-driven retry and backoff.
//!
//! Layers, leaf first:
//! - [`retry`]: pure retry decision and backoff delay.
//! - [`transport`]: the GET seam, with a libcurl implementation.
//! - [`fetch`]: the attempt loop, cancellation and exactly-once completion.

pub mod config;
pub mod logging;

pub mod fetch;
pub mod retry;
pub mod transport;

pub use fetch::{
    retriable_fetch, FailureKind, FetchError, FetchHandle, FetchResponse, NoRuntime, Outcome,
    RetriableFetch,
};
pub use retry::{BackoffType, RetryConfig, RetryOptions};
pub use tokio_util::sync::CancellationToken;
