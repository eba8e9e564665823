//! Callback-style entry point with an exactly-once completion guard.

use super::{FetchError, Outcome, RetriableFetch, Timer};
use crate::retry::RetryConfig;
use crate::transport::Transport;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// One-shot holder for the completion callback.
///
/// `complete` consumes the guard. If the guard is dropped without completing
/// (task aborted, runtime shut down, panic in the transport) the callback
/// still runs, with `FetchError::Cancelled`.
pub(crate) struct Completion {
    callback: Option<Callback>,
}

impl Completion {
    pub(crate) fn new<F>(on_complete: F) -> Self
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(on_complete)),
        }
    }

    pub(crate) fn complete(mut self, outcome: Outcome) {
        if let Some(cb) = self.callback.take() {
            cb(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(cb) = self.callback.take() {
            tracing::debug!("fetch dropped before completing; reporting cancellation");
            cb(Err(FetchError::Cancelled));
        }
    }
}

/// A fetch was started outside a tokio runtime. The callback was dropped
/// without being called.
#[derive(Debug, Error)]
#[error("retriable fetch must be started from within a tokio runtime")]
pub struct NoRuntime;

/// Handle to a spawned fetch. Dropping it detaches the fetch; it still
/// runs to completion and still calls back.
#[derive(Debug)]
pub struct FetchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FetchHandle {
    /// Stop issuing attempts. The callback fires with `Cancelled` unless the
    /// fetch already reached a terminal outcome.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this fetch, e.g. to tie it to a parent operation.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the callback has run.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

impl<T, S> RetriableFetch<T, S>
where
    T: Transport + 'static,
    S: Timer + 'static,
{
    /// Run the fetch on the tokio runtime and report through `on_complete`.
    ///
    /// The callback runs on a runtime task, never inside this call, and
    /// exactly once. Without a current runtime nothing is started and the
    /// callback is never called.
    pub fn spawn<F>(
        self: Arc<Self>,
        url: impl Into<String>,
        on_complete: F,
    ) -> Result<FetchHandle, NoRuntime>
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| NoRuntime)?;
        let url = url.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let completion = Completion::new(on_complete);
        let task = runtime.spawn(async move {
            let outcome = self.fetch(&url, &token).await;
            completion.complete(outcome);
        });
        Ok(FetchHandle { cancel, task })
    }
}

/// Fetch `url` through `transport` with `config`, calling `on_complete`
/// exactly once with the outcome. Fails with `NoRuntime` outside a tokio
/// runtime.
pub fn retriable_fetch<T, F>(
    transport: T,
    url: impl Into<String>,
    config: RetryConfig,
    on_complete: F,
) -> Result<FetchHandle, NoRuntime>
where
    T: Transport + 'static,
    F: FnOnce(Outcome) + Send + 'static,
{
    Arc::new(RetriableFetch::new(transport, config)).spawn(url, on_complete)
}
