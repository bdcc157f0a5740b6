//! # Admission Controller
//!
//! Token pool of size P that gates how many pages may be in flight at once.
//! Returning a token waits for the configured delay first, so the same pool
//! caps concurrency and shapes the dispatch rate:
//! at most P / (delay + average task duration) pages per unit of time.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Admission errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Admission pool closed")]
    Closed,

    #[error("Admission cancelled")]
    Cancelled,
}

/// One unit of admission capacity; hand it back through
/// [`AdmissionController::release`]
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

/// Counting semaphore with a mandatory hold time before release
#[derive(Debug, Clone)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    parallelism: usize,
    release_delay: Duration,
}

impl AdmissionController {
    /// Pool pre-filled with `parallelism` tokens
    #[must_use]
    pub fn new(parallelism: usize, release_delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(parallelism)),
            parallelism,
            release_delay,
        }
    }

    /// Waits until a token is free (FIFO)
    pub async fn acquire(&self) -> Result<AdmissionToken, AdmissionError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AdmissionError::Closed)?;
        trace!(available = self.available_tokens(), "🎫 admission token acquired");
        Ok(AdmissionToken { _permit: permit })
    }

    /// Like [`acquire`](Self::acquire) but gives up when `cancel` fires first
    pub async fn acquire_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<AdmissionToken, AdmissionError> {
        if cancel.is_cancelled() {
            return Err(AdmissionError::Cancelled);
        }
        tokio::select! {
            token = self.acquire() => token,
            () = cancel.cancelled() => Err(AdmissionError::Cancelled),
        }
    }

    /// Waits the release delay, then returns the token to the pool
    pub async fn release(&self, token: AdmissionToken) {
        if !self.release_delay.is_zero() {
            sleep(self.release_delay).await;
        }
        drop(token);
        trace!(available = self.available_tokens(), "🎫 admission token released");
    }

    #[must_use]
    pub fn available_tokens(&self) -> usize {
        self.semaphore.available_permits()
    }

    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism
    }

    #[must_use]
    pub const fn release_delay(&self) -> Duration {
        self.release_delay
    }
}
