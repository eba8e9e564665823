//! Per-call attempt state machine.
//!
//! ```text
//! Idle --start--> AttemptInFlight --200--> Succeeded
//!                   |   ^       \--transport error / non-retriable / exhausted--> Failed
//!    retriable 5xx  v   | backoff elapsed
//!                 AwaitingBackoff
//! ```
//! Any non-terminal phase moves to `Failed` on cancel. `Succeeded` and
//! `Failed` absorb every further transition.

use super::FailureKind;
use crate::retry::{compute_delay, is_retriable_status, should_retry, RetryConfig};
use std::time::Duration;

/// The only success status.
pub const SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    AttemptInFlight,
    /// Waiting out the given delay before the next attempt.
    AwaitingBackoff(Duration),
    Succeeded,
    Failed(FailureKind),
}

impl FetchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchPhase::Succeeded | FetchPhase::Failed(_))
    }
}

/// Classification of a received status, as applied by `on_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    RetryAfter(Duration),
    Fail(FailureKind),
}

/// Mutable state of one fetch. Never shared between calls.
#[derive(Debug, Clone)]
pub struct AttemptState {
    attempts_so_far: u32,
    requests_issued: u32,
    phase: FetchPhase,
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptState {
    pub fn new() -> Self {
        Self {
            attempts_so_far: 0,
            requests_issued: 0,
            phase: FetchPhase::Idle,
        }
    }

    /// Retries consumed so far (0 during the first attempt).
    pub fn attempts_so_far(&self) -> u32 {
        self.attempts_so_far
    }

    /// Requests actually handed to the transport, the first attempt included.
    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    /// The in-flight attempt's request is going out now.
    pub fn request_sent(&mut self) {
        if self.phase == FetchPhase::AttemptInFlight {
            self.requests_issued = self.requests_issued.saturating_add(1);
        }
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Idle -> AttemptInFlight.
    pub fn start(&mut self) -> FetchPhase {
        if self.phase == FetchPhase::Idle {
            self.phase = FetchPhase::AttemptInFlight;
        }
        self.phase
    }

    /// AwaitingBackoff -> AttemptInFlight, consuming one retry.
    pub fn backoff_elapsed(&mut self) -> FetchPhase {
        if let FetchPhase::AwaitingBackoff(_) = self.phase {
            self.attempts_so_far = self.attempts_so_far.saturating_add(1);
            self.phase = FetchPhase::AttemptInFlight;
        }
        self.phase
    }

    /// Classify the status of the in-flight attempt and move to the next phase.
    pub fn on_status(&mut self, config: &RetryConfig, status: u16) -> Verdict {
        match self.phase {
            FetchPhase::Idle | FetchPhase::AttemptInFlight => {}
            FetchPhase::AwaitingBackoff(delay) => return Verdict::RetryAfter(delay),
            FetchPhase::Succeeded => return Verdict::Success,
            FetchPhase::Failed(kind) => return Verdict::Fail(kind),
        }

        let verdict = if status == SUCCESS_STATUS {
            Verdict::Success
        } else if should_retry(config, self.attempts_so_far, status) {
            Verdict::RetryAfter(compute_delay(config, self.attempts_so_far))
        } else if is_retriable_status(status) {
            Verdict::Fail(FailureKind::RetriesExhausted)
        } else {
            Verdict::Fail(FailureKind::NonRetriableStatus)
        };

        self.phase = match verdict {
            Verdict::Success => FetchPhase::Succeeded,
            Verdict::RetryAfter(delay) => FetchPhase::AwaitingBackoff(delay),
            Verdict::Fail(kind) => FetchPhase::Failed(kind),
        };
        verdict
    }

    /// AttemptInFlight -> Failed(Transport).
    pub fn on_transport_error(&mut self) -> FetchPhase {
        if self.phase == FetchPhase::AttemptInFlight {
            self.phase = FetchPhase::Failed(FailureKind::Transport);
        }
        self.phase
    }

    /// Any non-terminal phase -> Failed(Cancelled).
    pub fn cancel(&mut self) -> FetchPhase {
        if !self.phase.is_terminal() {
            self.phase = FetchPhase::Failed(FailureKind::Cancelled);
        }
        self.phase
    }
}
