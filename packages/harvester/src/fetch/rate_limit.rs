//! Single-slot request permit, refilled by a timer task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::{HarvesterError, Result};

/// Smallest refill interval the timer accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Rate limiter handing out at most one request permit per interval.
///
/// The slot starts full. Each acquisition wakes a background task that
/// puts the permit back one `interval` after it was taken, so consecutive
/// permits are always at least `interval` apart and never pile up while
/// the fetcher is idle. The task lives as long as the limiter.
///
/// Share one limiter (via `Arc`) between fetchers that draw on the same
/// remote quota; separate limiters never coordinate.
#[derive(Debug)]
pub struct RateLimiter {
    slot: Arc<Semaphore>,
    consumed: Arc<Notify>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl RateLimiter {
    /// Create a limiter and start its refill task.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let slot = Arc::new(Semaphore::new(1));
        let consumed = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        tokio::spawn(refill(
            Arc::clone(&slot),
            Arc::clone(&consumed),
            interval,
            shutdown.clone(),
        ));

        Self {
            slot,
            consumed,
            interval,
            shutdown,
        }
    }

    /// The refill interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the permit and consume it.
    ///
    /// Returns `HarvesterError::Cancelled` when `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(HarvesterError::Cancelled),
            permit = self.slot.acquire() => {
                // The semaphore is never closed while `self` is alive.
                let permit = permit.map_err(|_| HarvesterError::Cancelled)?;
                permit.forget();
                self.consumed.notify_one();
                Ok(())
            }
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn refill(
    slot: Arc<Semaphore>,
    consumed: Arc<Notify>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = consumed.notified() => {}
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => slot.add_permits(1),
        }
    }

    tracing::trace!("rate limiter refill task stopped");
}
