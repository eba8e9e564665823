//! In-process transport and timers for driving the fetch loop in tests.

use async_trait::async_trait;
use rfetch_core::fetch::Timer;
use rfetch_core::transport::{BodyStream, Transport, TransportError, TransportResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub enum Step {
    /// Respond with this status (200 carries the transport's body).
    Status(u16),
    /// Fail at the connection level.
    Refused,
    /// Never resolve.
    Hang,
}

/// Plays `steps` in order, one per `get`; the last step repeats.
pub struct ScriptedTransport {
    steps: Vec<Step>,
    body: Vec<u8>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    urls: Mutex<Vec<String>>,
    pub called: Notify,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty());
        Self {
            steps,
            body: b"payload".to_vec(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            called: Notify::new(),
        }
    }

    pub fn statuses(statuses: &[u16]) -> Self {
        Self::new(statuses.iter().map(|s| Step::Status(*s)).collect())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        self.called.notify_one();

        // Yield once so an attempt is genuinely asynchronous.
        tokio::task::yield_now().await;

        match &self.steps[n.min(self.steps.len() - 1)] {
            Step::Status(status) => {
                let body = if *status == 200 {
                    BodyStream::from_bytes(self.body.clone())
                } else {
                    BodyStream::empty()
                };
                Ok(TransportResponse {
                    status: *status,
                    body,
                })
            }
            Step::Refused => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Records every requested delay and returns immediately.
#[derive(Default)]
pub struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
        tokio::task::yield_now().await;
    }
}

/// Signals when a backoff wait begins, then never finishes.
#[derive(Default)]
pub struct StuckTimer {
    pub entered: Notify,
}

#[async_trait]
impl Timer for StuckTimer {
    async fn sleep(&self, _delay: Duration) {
        self.entered.notify_one();
        std::future::pending::<()>().await;
    }
}
