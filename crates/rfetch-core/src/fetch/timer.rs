//! Timer seam for backoff waits.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Something that can wait for a duration. Production uses tokio's timer;
/// tests substitute a recording timer.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        // tokio clamps deadlines past the far future, so Duration::MAX is safe.
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl<T: Timer + ?Sized> Timer for Arc<T> {
    async fn sleep(&self, delay: Duration) {
        (**self).sleep(delay).await
    }
}
