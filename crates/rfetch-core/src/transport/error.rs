//! Connection-level failures reported by a transport.

use thiserror::Error;

/// Failure below the HTTP status layer. Never retried by the fetch loop.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (DNS, connect refused, TLS, timeout, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The transfer ended before a final status line arrived.
    #[error("connection closed before a response status was received")]
    NoResponse,
    /// The status was delivered but the body stream broke off.
    #[error("response body interrupted: {0}")]
    BodyInterrupted(curl::Error),
    /// I/O failure from a non-curl transport.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
