use std::num::NonZeroUsize;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{ExecuteError, Result};

/// Bounds the number of queries in flight on the query engines.
#[derive(Debug)]
pub struct QueryLimiter {
    semaphore: Semaphore,
    queue_timeout: Duration,
}

impl QueryLimiter {
    pub fn new(max_concurrent: NonZeroUsize, queue_timeout: Duration) -> Self {
        Self {
            semaphore: Semaphore::new(max_concurrent.get()),
            queue_timeout,
        }
    }

    /// Wait for a query slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        match tokio::time::timeout(self.queue_timeout, self.semaphore.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            // the semaphore is never closed
            Ok(Err(_)) | Err(_) => Err(ExecuteError::TooManyQueries(self.queue_timeout)),
        }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
