//! Retriable fetch orchestrator.
//!
//! Drives the attempt loop for one URL: issue a GET, classify the status,
//! wait out the backoff on a transient failure, and stop at the first
//! terminal outcome. Each call owns its `AttemptState`; a `RetriableFetch`
//! can serve many concurrent calls.

mod completion;
mod error;
mod state;
mod timer;

pub use completion::{retriable_fetch, FetchHandle, NoRuntime};
pub use error::{FailureKind, FetchError};
pub use state::{AttemptState, FetchPhase, Verdict, SUCCESS_STATUS};
pub use timer::{Timer, TokioTimer};

use crate::retry::RetryConfig;
use crate::transport::{BodyStream, SinkError, Transport, TransportResponse};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Result of a fetch, reported exactly once.
pub type Outcome = Result<FetchResponse, FetchError>;

/// A successful (200) response. The body has not been read; the caller
/// decides where it goes.
#[derive(Debug)]
pub struct FetchResponse {
    status: u16,
    attempts: u32,
    body: BodyStream,
}

impl FetchResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Requests issued to get this response, the first attempt included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn body(&mut self) -> &mut BodyStream {
        &mut self.body
    }

    pub fn into_body(self) -> BodyStream {
        self.body
    }

    /// Stream the body into a file at `path`.
    pub async fn save_to(self, path: &Path) -> Result<u64, SinkError> {
        self.body.save_to(path).await
    }
}

/// Retry engine bound to one transport, one config and one timer.
pub struct RetriableFetch<T, S = TokioTimer> {
    transport: T,
    config: RetryConfig,
    timer: S,
}

impl<T: Transport> RetriableFetch<T> {
    pub fn new(transport: T, config: RetryConfig) -> Self {
        Self {
            transport,
            config,
            timer: TokioTimer,
        }
    }
}

impl<T: Transport, S: Timer> RetriableFetch<T, S> {
    /// Swap the timer used for backoff waits.
    pub fn with_timer<S2: Timer>(self, timer: S2) -> RetriableFetch<T, S2> {
        RetriableFetch {
            transport: self.transport,
            config: self.config,
            timer,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url`, retrying transient 5xx statuses per the config.
    ///
    /// At most one attempt is in flight at a time. `cancel` is honored both
    /// while an attempt is in flight and during a backoff wait; either way
    /// no further attempt is issued and the result is `Cancelled`.
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Outcome {
        let mut state = AttemptState::new();
        state.start();

        loop {
            let attempt = async {
                state.request_sent();
                tracing::debug!(url, attempt = state.requests_issued(), "GET");
                self.transport.get(url).await
            };
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = attempt => Some(result),
            };
            let Some(result) = result else {
                return Err(cancelled(&mut state, url));
            };

            let TransportResponse { status, body } = match result {
                Ok(response) => response,
                Err(e) => {
                    state.on_transport_error();
                    tracing::warn!(url, "transport error (not retried): {}", e);
                    return Err(FetchError::Transport(e));
                }
            };

            match state.on_status(&self.config, status) {
                Verdict::Success => {
                    tracing::debug!(url, attempts = state.requests_issued(), "HTTP 200");
                    return Ok(FetchResponse {
                        status,
                        attempts: state.requests_issued(),
                        body,
                    });
                }
                Verdict::RetryAfter(delay) => {
                    // The failed response's body is never read; dropping it releases the connection.
                    drop(body);
                    tracing::info!(
                        url,
                        status,
                        "Retrying #{} in {:?}",
                        state.attempts_so_far() + 1,
                        delay
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(cancelled(&mut state, url)),
                        _ = self.timer.sleep(delay) => {}
                    }
                    state.backoff_elapsed();
                }
                Verdict::Fail(FailureKind::RetriesExhausted) => {
                    let retries = state.attempts_so_far();
                    tracing::warn!(url, status, retries, "retries exhausted");
                    return Err(FetchError::RetriesExhausted { status, retries });
                }
                Verdict::Fail(_) => {
                    tracing::warn!(url, status, "non-retriable status");
                    return Err(FetchError::NonRetriableStatus { status });
                }
            }
        }
    }
}

fn cancelled(state: &mut AttemptState, url: &str) -> FetchError {
    let phase = state.phase();
    state.cancel();
    tracing::info!(url, ?phase, "fetch cancelled after {} request(s)", state.requests_issued());
    FetchError::Cancelled
}
