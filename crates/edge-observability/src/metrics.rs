//! Worker-level cache metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use edge_cache::CacheStatus;
use serde::{Deserialize, Serialize};

/// Counters shared by every event task of a worker.
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    network: AtomicU64,
    bypassed: AtomicU64,
    fallbacks: AtomicU64,
    shell_fallbacks: AtomicU64,
    failures: AtomicU64,
    write_backs: AtomicU64,
    write_back_errors: AtomicU64,
    installs: AtomicU64,
    install_failures: AtomicU64,
    activations: AtomicU64,
    stores_pruned: AtomicU64,
    notifications_shown: AtomicU64,
    notification_clicks: AtomicU64,
}

/// Point-in-time copy of [`WorkerMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub network: u64,
    pub bypassed: u64,
    pub fallbacks: u64,
    pub shell_fallbacks: u64,
    pub failures: u64,
    pub write_backs: u64,
    pub write_back_errors: u64,
    pub installs: u64,
    pub install_failures: u64,
    pub activations: u64,
    pub stores_pruned: u64,
    pub notifications_shown: u64,
    pub notification_clicks: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl WorkerMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a served response.
    pub fn record_served(&self, status: CacheStatus) {
        match status {
            CacheStatus::Hit => bump(&self.hits),
            CacheStatus::Miss => bump(&self.misses),
            CacheStatus::Network => bump(&self.network),
            CacheStatus::Bypass => bump(&self.bypassed),
            CacheStatus::Fallback => bump(&self.fallbacks),
            CacheStatus::Shell => bump(&self.shell_fallbacks),
        }
    }

    /// Record a request that failed with no fallback.
    pub fn record_failure(&self) {
        bump(&self.failures);
    }

    /// Record an opportunistic write into the snapshot store.
    pub fn record_write_back(&self, ok: bool) {
        if ok {
            bump(&self.write_backs);
        } else {
            bump(&self.write_back_errors);
        }
    }

    /// Record an install attempt.
    pub fn record_install(&self, ok: bool) {
        if ok {
            bump(&self.installs);
        } else {
            bump(&self.install_failures);
        }
    }

    /// Record an activation and the number of stale stores it removed.
    pub fn record_activation(&self, pruned: usize) {
        bump(&self.activations);
        self.stores_pruned.fetch_add(pruned as u64, Ordering::Relaxed);
    }

    /// Record a displayed notification.
    pub fn record_notification(&self) {
        bump(&self.notifications_shown);
    }

    /// Record a notification click.
    pub fn record_click(&self) {
        bump(&self.notification_clicks);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            hits: load(&self.hits),
            misses: load(&self.misses),
            network: load(&self.network),
            bypassed: load(&self.bypassed),
            fallbacks: load(&self.fallbacks),
            shell_fallbacks: load(&self.shell_fallbacks),
            failures: load(&self.failures),
            write_backs: load(&self.write_backs),
            write_back_errors: load(&self.write_back_errors),
            installs: load(&self.installs),
            install_failures: load(&self.install_failures),
            activations: load(&self.activations),
            stores_pruned: load(&self.stores_pruned),
            notifications_shown: load(&self.notifications_shown),
            notification_clicks: load(&self.notification_clicks),
        }
    }
}

impl MetricsSnapshot {
    /// Requests answered from the snapshot store.
    pub fn served_from_snapshot(&self) -> u64 {
        self.hits + self.fallbacks + self.shell_fallbacks
    }

    /// Share of intercepted cache-first lookups that hit, in `[0, 1]`.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let lines = [
            format!(
                "Fetch: {} hit, {} miss, {} network, {} bypass",
                self.hits, self.misses, self.network, self.bypassed
            ),
            format!(
                "Offline: {} fallback, {} shell, {} failed",
                self.fallbacks, self.shell_fallbacks, self.failures
            ),
            format!(
                "Write-back: {} ok, {} failed",
                self.write_backs, self.write_back_errors
            ),
            format!(
                "Lifecycle: {} installed, {} install failures, {} activated, {} stores pruned",
                self.installs, self.install_failures, self.activations, self.stores_pruned
            ),
            format!(
                "Push: {} shown, {} clicked",
                self.notifications_shown, self.notification_clicks
            ),
        ];
        lines.join("\n")
    }
}
