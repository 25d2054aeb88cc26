//! Suspension clocks for the simulation engine
//!
//! The engine never sleeps directly. Every suspension goes through a [`Clock`]
//! so the same step loop can run against wall time or a virtual timeline:
//! - [`TokioClock`]: sleeps on the Tokio timer
//! - [`VirtualClock`]: records the simulated time and returns immediately

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of suspension for simulated time slices.
pub trait Clock: Send + Sync + 'static {
    /// Suspend the caller for `duration` of simulated time.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall-clock suspension on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Clock that advances instantly.
///
/// Clones share the same timeline, so a test can hand one clone to an engine
/// and read the accumulated simulated time from another.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    inner: Arc<VirtualTimeline>,
}

#[derive(Debug, Default)]
struct VirtualTimeline {
    elapsed_nanos: AtomicU64,
    sleeps: AtomicUsize,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time slept so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.inner.elapsed_nanos.load(Ordering::Acquire))
    }

    /// Number of suspensions taken so far
    pub fn sleeps(&self) -> usize {
        self.inner.sleeps.load(Ordering::Acquire)
    }
}

impl Clock for VirtualClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let timeline = Arc::clone(&self.inner);
        async move {
            let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
            timeline.elapsed_nanos.fetch_add(nanos, Ordering::AcqRel);
            timeline.sleeps.fetch_add(1, Ordering::AcqRel);
            // Still a real yield point so other tasks get a turn
            tokio::task::yield_now().await;
        }
    }
}
