//! Cooperative cancellation for in-flight engine operations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Shared cancellation signal.
///
/// Each call to [`CancelToken::cancel`] starts a new generation. Operations
/// hold a [`CancelScope`] armed at the generation they started in, so one
/// token can be shared between engines without an operation starting on one
/// engine clearing a cancel meant for another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelSignal>,
}

#[derive(Debug, Default)]
struct CancelSignal {
    generation: AtomicU64,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop every operation currently holding a scope of this token at its
    /// next suspension point
    pub fn cancel(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.notify.notify_waiters();
    }

    /// Scope for an operation starting now; earlier cancels do not apply to it
    pub fn scope(&self) -> CancelScope {
        CancelScope {
            token: self.clone(),
            armed_at: self.generation(),
        }
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }
}

/// Cancellation view of a single operation
#[derive(Debug, Clone)]
pub struct CancelScope {
    token: CancelToken,
    armed_at: u64,
}

impl CancelScope {
    /// True once the token was cancelled after this scope was armed
    pub fn is_cancelled(&self) -> bool {
        self.token.generation() != self.armed_at
    }

    /// Resolves once the token is cancelled after this scope was armed
    pub async fn cancelled(&self) {
        loop {
            let notified = self.token.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent cancel is not missed
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
