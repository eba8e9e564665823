//! Terminal failures of a retriable fetch.

use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Why a fetch ended without a 200. Reported once, through the completion
/// channel; nothing here is retried further.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection-level failure. Never retried, whatever the budget.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    /// A transient 5xx persisted past the retry budget.
    #[error("retries exhausted: HTTP {status} after {retries} retries")]
    RetriesExhausted { status: u16, retries: u32 },
    /// Any status outside 200 and the transient set.
    #[error("non-retriable status: HTTP {status}")]
    NonRetriableStatus { status: u16 },
    /// Caller cancelled during an attempt or a backoff wait.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Tag-only view of `FetchError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    RetriesExhausted,
    NonRetriableStatus,
    Cancelled,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::RetriesExhausted { .. } => FailureKind::RetriesExhausted,
            FetchError::NonRetriableStatus { .. } => FailureKind::NonRetriableStatus,
            FetchError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Last HTTP status observed, for status-driven failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RetriesExhausted { status, .. }
            | FetchError::NonRetriableStatus { status } => Some(*status),
            FetchError::Transport(_) | FetchError::Cancelled => None,
        }
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::RetriesExhausted => "retries-exhausted",
            FailureKind::NonRetriableStatus => "non-retriable-status",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
