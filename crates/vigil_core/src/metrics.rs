//! Metrics collection for bot operations.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector shared between the Discord layer and the healthcheck
/// server.
#[derive(Debug, Clone)]
pub struct BotMetrics {
    inner: Arc<BotMetricsInner>,
}

#[derive(Debug)]
struct BotMetricsInner {
    // Reconciler
    sweeps_completed: AtomicU64,
    sweeps_skipped: AtomicU64,
    roles_granted: AtomicU64,
    roles_revoked: AtomicU64,
    reconcile_failures: AtomicU64,
    last_sweep: parking_lot::Mutex<Option<Instant>>,

    // Workflow
    applications_started: AtomicU64,
    applications_submitted: AtomicU64,
    applications_cancelled: AtomicU64,

    // Gateway identity, set once the session is ready
    bot_tag: parking_lot::Mutex<Option<String>>,
}

impl Default for BotMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BotMetrics {
    /// Creates a new metrics collector with all counters at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BotMetricsInner {
                sweeps_completed: AtomicU64::new(0),
                sweeps_skipped: AtomicU64::new(0),
                roles_granted: AtomicU64::new(0),
                roles_revoked: AtomicU64::new(0),
                reconcile_failures: AtomicU64::new(0),
                last_sweep: parking_lot::Mutex::new(None),
                applications_started: AtomicU64::new(0),
                applications_submitted: AtomicU64::new(0),
                applications_cancelled: AtomicU64::new(0),
                bot_tag: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Records a completed full sweep.
    pub fn record_sweep(&self) {
        self.inner.sweeps_completed.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_sweep.lock() = Some(Instant::now());
    }

    /// Records a sweep tick skipped because the previous sweep still runs.
    pub fn record_sweep_skipped(&self) {
        self.inner.sweeps_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a role grant.
    pub fn record_grant(&self) {
        self.inner.roles_granted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a role revoke.
    pub fn record_revoke(&self) {
        self.inner.roles_revoked.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a per-member reconcile failure.
    pub fn record_reconcile_failure(&self) {
        self.inner.reconcile_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an opened application session.
    pub fn record_application_started(&self) {
        self.inner
            .applications_started
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records a submitted application.
    pub fn record_application_submitted(&self) {
        self.inner
            .applications_submitted
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cancelled application session.
    pub fn record_application_cancelled(&self) {
        self.inner
            .applications_cancelled
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records the logged-in bot's tag once the gateway session is ready.
    pub fn set_bot_tag(&self, tag: impl Into<String>) {
        *self.inner.bot_tag.lock() = Some(tag.into());
    }

    /// The logged-in bot's tag, once known.
    pub fn bot_tag(&self) -> Option<String> {
        self.inner.bot_tag.lock().clone()
    }

    /// Seconds since the last completed sweep.
    pub fn seconds_since_sweep(&self) -> Option<u64> {
        self.inner
            .last_sweep
            .lock()
            .map(|instant| instant.elapsed().as_secs())
    }

    /// Creates a serializable snapshot of current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            sweeps_completed: inner.sweeps_completed.load(Ordering::Relaxed),
            sweeps_skipped: inner.sweeps_skipped.load(Ordering::Relaxed),
            roles_granted: inner.roles_granted.load(Ordering::Relaxed),
            roles_revoked: inner.roles_revoked.load(Ordering::Relaxed),
            reconcile_failures: inner.reconcile_failures.load(Ordering::Relaxed),
            seconds_since_sweep: self.seconds_since_sweep(),
            applications_started: inner.applications_started.load(Ordering::Relaxed),
            applications_submitted: inner.applications_submitted.load(Ordering::Relaxed),
            applications_cancelled: inner.applications_cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of bot metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Completed full reconciliation sweeps
    pub sweeps_completed: u64,
    /// Sweep ticks skipped due to an in-flight sweep
    pub sweeps_skipped: u64,
    /// Roles granted by the reconciler
    pub roles_granted: u64,
    /// Roles revoked by the reconciler
    pub roles_revoked: u64,
    /// Per-member reconcile failures
    pub reconcile_failures: u64,
    /// Seconds since the last completed sweep
    pub seconds_since_sweep: Option<u64>,
    /// Application sessions opened
    pub applications_started: u64,
    /// Applications submitted
    pub applications_submitted: u64,
    /// Application sessions cancelled
    pub applications_cancelled: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = BotMetrics::new();
        metrics.record_grant();
        metrics.record_grant();
        metrics.record_revoke();
        metrics.record_sweep_skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.roles_granted, 2);
        assert_eq!(snapshot.roles_revoked, 1);
        assert_eq!(snapshot.sweeps_skipped, 1);
        assert_eq!(snapshot.sweeps_completed, 0);
    }

    #[test]
    fn test_sweep_timestamp() {
        let metrics = BotMetrics::new();
        assert_eq!(metrics.seconds_since_sweep(), None);
        metrics.record_sweep();
        assert!(metrics.seconds_since_sweep().is_some());
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = BotMetrics::new();
        let clone = metrics.clone();
        clone.record_application_submitted();
        assert_eq!(metrics.snapshot().applications_submitted, 1);
    }
}
