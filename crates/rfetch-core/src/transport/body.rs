//! Lazily consumed response body.

use super::TransportError;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// One chunk of body bytes, or the error that ended the stream.
pub type BodyChunk = Result<Vec<u8>, TransportError>;

/// Failure while draining a body into a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{0}")]
    Body(#[from] TransportError),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Response body delivered chunk by chunk over a bounded channel.
///
/// The producer (e.g. the curl worker) blocks when the channel is full, so
/// memory use stays at a few chunks regardless of payload size. Dropping the
/// stream makes the producer abort its transfer.
#[derive(Debug)]
pub struct BodyStream {
    rx: mpsc::Receiver<BodyChunk>,
}

impl BodyStream {
    /// Wrap the receiving half of a body channel.
    pub fn new(rx: mpsc::Receiver<BodyChunk>) -> Self {
        Self { rx }
    }

    /// A body holding `bytes` as a single chunk.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let bytes = bytes.into();
        if !bytes.is_empty() {
            // Capacity 1 on a fresh channel: cannot be full.
            let _ = tx.try_send(Ok(bytes));
        }
        Self { rx }
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Next chunk, or `None` once the body is complete.
    pub async fn next_chunk(&mut self) -> Option<BodyChunk> {
        self.rx.recv().await
    }

    /// Stream every chunk into `writer`. Returns the number of bytes written.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64, SinkError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.next_chunk().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    /// Stream the body into a newly created (or truncated) file at `path`.
    pub async fn save_to(self, path: &Path) -> Result<u64, SinkError> {
        let mut file = tokio::fs::File::create(path).await?;
        let written = self.copy_to(&mut file).await?;
        file.sync_all().await?;
        Ok(written)
    }

    /// Collect the whole body in memory. Only for small payloads.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}
