//! libcurl-backed transport.
//!
//! Each GET runs on a blocking worker (`spawn_blocking`). The worker reports
//! the final status when the first body bytes arrive (or the transfer ends
//! without a body), then feeds body chunks into a bounded channel that the
//! caller drains at its own pace.

use super::parse::parse_status_line;
use super::{BodyChunk, BodyStream, Transport, TransportError, TransportResponse};
use async_trait::async_trait;
use std::cell::Cell;
use std::str;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type StatusSender = oneshot::Sender<Result<u16, TransportError>>;

/// Tuning knobs for the curl transport.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub user_agent: Option<String>,
    /// Proxy URL. `None` leaves libcurl's environment lookup (`https_proxy`, ...) in place.
    pub proxy: Option<String>,
    /// Tunnel plain HTTP through the proxy with CONNECT as well.
    pub proxy_tunnel: bool,
    /// Body chunks buffered between the curl worker and the reader.
    pub body_buffer_chunks: usize,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            user_agent: None,
            proxy: None,
            proxy_tunnel: false,
            body_buffer_chunks: 16,
        }
    }
}

/// HTTP GET over libcurl. Redirects are not followed: a 3xx is handed back
/// as-is and the fetch loop treats it as a non-retriable status.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CurlOptions {
        &self.options
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let (status_tx, status_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(self.options.body_buffer_chunks.max(1));
        let url = url.to_string();
        let options = self.options.clone();

        // Detached: the worker exits once the body is drained or its receivers are gone.
        tokio::task::spawn_blocking(move || run_get(&url, &options, status_tx, body_tx));

        match status_rx.await {
            Ok(Ok(status)) => Ok(TransportResponse {
                status,
                body: BodyStream::new(body_rx),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TransportError::NoResponse),
        }
    }
}

/// Worker body: perform the transfer and route any failure to whichever
/// side is still listening (status before it was delivered, body after).
fn run_get(
    url: &str,
    options: &CurlOptions,
    status_tx: StatusSender,
    body_tx: mpsc::Sender<BodyChunk>,
) {
    let mut status_tx = Some(status_tx);
    let result = perform(url, options, &mut status_tx, &body_tx);
    match (result, status_tx.take()) {
        (Err(e), Some(tx)) => {
            tracing::debug!(url, "GET failed before status: {}", e);
            let _ = tx.send(Err(TransportError::Curl(e)));
        }
        (Err(e), None) => {
            // Also hit when the reader dropped the body on purpose; the send then fails quietly.
            let _ = body_tx.blocking_send(Err(TransportError::BodyInterrupted(e)));
        }
        (Ok(()), _) => {}
    }
}

fn perform(
    url: &str,
    options: &CurlOptions,
    status_tx: &mut Option<StatusSender>,
    body_tx: &mpsc::Sender<BodyChunk>,
) -> Result<(), curl::Error> {
    let last_status = Cell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(false)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.low_speed_limit(options.low_speed_limit)?;
    easy.low_speed_time(options.low_speed_time)?;
    if let Some(ua) = &options.user_agent {
        easy.useragent(ua)?;
    }
    if let Some(proxy) = &options.proxy {
        easy.proxy(proxy)?;
    }
    easy.http_proxy_tunnel(options.proxy_tunnel)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            on_header(data, &last_status);
            true
        })?;
        transfer.write_function(|data| {
            if !deliver_status(last_status.get(), status_tx) {
                return Ok(0); // nobody waiting: abort transfer
            }
            if body_tx.blocking_send(Ok(data.to_vec())).is_err() {
                return Ok(0); // reader gone: abort transfer
            }
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    // Responses without a body never reach the write callback.
    deliver_status(last_status.get(), status_tx);
    Ok(())
}

/// Remember the status line of the latest header block. A proxy CONNECT
/// reply or an interim 1xx is overwritten by the block that follows it.
fn on_header(data: &[u8], last_status: &Cell<Option<u16>>) {
    if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
        last_status.set(Some(code));
    }
}

/// Hand the final status to the caller, once: on the first body bytes or
/// when the transfer ends. Returns false if nobody is waiting any more.
fn deliver_status(status: Option<u16>, status_tx: &mut Option<StatusSender>) -> bool {
    let Some(tx) = status_tx.take() else {
        return true;
    };
    match status {
        Some(code) => tx.send(Ok(code)).is_ok(),
        None => {
            let _ = tx.send(Err(TransportError::NoResponse));
            false
        }
    }
}
