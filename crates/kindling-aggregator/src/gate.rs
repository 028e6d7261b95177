use kindling_core::AggregateError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Default number of simultaneous upstream detail fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

/// Caps the number of simultaneously in-flight upstream detail fetches.
///
/// At most K callers hold a permit at once; the rest queue in the
/// semaphore's FIFO waiter list, so no waiter starves under steady load.
/// Clones share the same permit pool.
#[derive(Debug, Clone)]
pub struct FetchGate {
    permits: Arc<Semaphore>,
}

impl FetchGate {
    /// Creates a gate admitting at most `max_concurrent` holders.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Waits for a permit, or returns `Cancelled` once the token fires.
    ///
    /// The permit returns to the pool when dropped, on every exit path.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<FetchPermit, AggregateError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AggregateError::Cancelled),
            permit = Arc::clone(&self.permits).acquire_owned() => {
                match permit {
                    Ok(permit) => Ok(FetchPermit { _permit: permit }),
                    // the semaphore is never closed
                    Err(_) => Err(AggregateError::Cancelled),
                }
            }
        }
    }

    /// Number of permits not currently held.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_FETCHES)
    }
}

/// RAII guard for a slot in the gate.
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}
