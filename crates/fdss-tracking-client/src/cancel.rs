//! Cooperative cancellation for one tracking fetch.
//!
//! A [`CancelToken`] has two observable effects:
//!
//! 1. Every await point of the fetch (send, retry sleep, body read) races the
//!    token through [`CancelToken::run`]. Cancelling drops the losing future,
//!    which aborts the in-flight HTTP request.
//! 2. A continuation that finishes after cancellation checks
//!    [`CancelToken::is_cancelled`] before touching any state.
//!
//! Clones share the same flag. Cancelling is idempotent.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag for one activation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag and wake everything waiting on it.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel() cannot slip
            // between the check and the await.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Drive `fut` to completion unless the token is cancelled first.
    ///
    /// Returns `None` when cancelled; `fut` is dropped at that point.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
