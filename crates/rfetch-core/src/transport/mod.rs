//! HTTP transport seam.
//!
//! The fetch loop only needs "GET this URL, give me a status and a body".
//! `CurlTransport` is the production implementation; tests plug in scripted
//! transports.

mod body;
mod error;
mod libcurl;
mod parse;

pub use body::{BodyChunk, BodyStream, SinkError};
pub use error::TransportError;
pub use libcurl::{CurlOptions, CurlTransport};

use async_trait::async_trait;
use std::sync::Arc;

/// A response whose status line has arrived. The body has not been read yet.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: BodyStream,
}

/// Issues a single GET. One call is one attempt; retrying is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        (**self).get(url).await
    }
}
