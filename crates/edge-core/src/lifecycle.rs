//! Worker lifecycle tracking.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Lifecycle states of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, install not started.
    Parsed,
    /// Populating the snapshot store.
    Installing,
    /// Snapshot complete, waiting for promotion.
    Installed,
    /// Pruning stale snapshot stores.
    Activating,
    /// Serving requests.
    Activated,
    /// Failed to install, or superseded by a newer version.
    Redundant,
}

impl WorkerState {
    /// Whether the state machine allows moving to `next`.
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Parsed, Installing)
                | (Installing, Installed)
                | (Installed, Activating)
                | (Activating, Activated)
                | (Installing, Redundant)
                | (Installed, Redundant)
                | (Activating, Redundant)
                | (Activated, Redundant)
        )
    }

    /// Whether a worker in this state may answer fetch events.
    pub fn serves_requests(self) -> bool {
        self == WorkerState::Activated
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parsed => write!(f, "parsed"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// Tracks event tasks the host must let settle before terminating the worker.
///
/// Every event handler holds a [`KeepAliveGuard`] for as long as its unit of
/// work runs. The host may only suspend the worker context while
/// [`KeepAlive::is_idle`] is true.
#[derive(Debug, Clone, Default)]
pub struct KeepAlive {
    inner: Arc<KeepAliveInner>,
}

#[derive(Debug, Default)]
struct KeepAliveInner {
    pending: AtomicUsize,
    settled: Notify,
}

impl KeepAlive {
    /// Create a tracker with no pending work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the worker lifetime until the returned guard is dropped.
    pub fn hold(&self, event: &'static str) -> KeepAliveGuard {
        let pending = self.inner.pending.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(event, pending, "keep-alive acquired");
        KeepAliveGuard {
            inner: Arc::clone(&self.inner),
            event,
        }
    }

    /// Number of unsettled event tasks.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Whether the host may terminate the worker now.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Resolve once every outstanding guard has been dropped.
    pub async fn idle(&self) {
        loop {
            let settled = self.inner.settled.notified();
            if self.is_idle() {
                return;
            }
            settled.await;
        }
    }
}

/// Scoped keep-alive handle for one event task.
#[derive(Debug)]
pub struct KeepAliveGuard {
    inner: Arc<KeepAliveInner>,
    event: &'static str,
}

impl KeepAliveGuard {
    /// Event this guard was taken for.
    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for KeepAliveGuard {
    fn drop(&mut self) {
        let previous = self.inner.pending.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(event = self.event, pending = previous - 1, "keep-alive released");
        if previous == 1 {
            self.inner.settled.notify_waiters();
        }
    }
}
