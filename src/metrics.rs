use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, trace};

use crate::sharded::ShardedCounter;

/// Metrics for counter store operations
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Total number of increment-and-rank operations
    pub increment_count: AtomicU64,
    /// Total number of range reads
    pub range_read_count: AtomicU64,
    /// Total number of failed store operations
    pub error_count: AtomicU64,
    /// Total time spent inside increment operations (nanoseconds)
    pub increment_latency_ns: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_increment(&self, latency: Duration) {
        self.increment_count.fetch_add(1, Ordering::Relaxed);
        self.increment_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        trace!(store_op = "increment", latency_ns = latency.as_nanos() as u64);
    }

    pub fn record_range_read(&self, entries: usize) {
        self.range_read_count.fetch_add(1, Ordering::Relaxed);
        trace!(store_op = "range_read", entries = entries);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Calculate average increment latency in microseconds
    pub fn avg_increment_latency_us(&self) -> f64 {
        let count = self.increment_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let total_ns = self.increment_latency_ns.load(Ordering::Relaxed);
        (total_ns as f64 / count as f64) / 1_000.0
    }

    /// Log a summary of store metrics
    pub fn log_summary(&self) {
        info!(
            operation = "store_metrics_summary",
            increments = self.increment_count.load(Ordering::Relaxed),
            range_reads = self.range_read_count.load(Ordering::Relaxed),
            errors = self.error_count.load(Ordering::Relaxed),
            avg_increment_latency_us = self.avg_increment_latency_us(),
        );
    }
}

/// Metrics for probe dispatch. The dispatch counters are sharded
/// because a batch increments them from many tasks at once.
#[derive(Debug, Default)]
pub struct ProbeMetrics {
    /// Total number of probes dispatched
    pub dispatched: ShardedCounter,
    /// Total number of probes that returned a decoded success payload
    pub succeeded: ShardedCounter,
    /// Total number of probes that failed (any failure kind)
    pub failed: ShardedCounter,
    /// Total number of batches cancelled as a whole
    pub cancelled_batches: AtomicU64,
    /// Total time spent in probe calls (nanoseconds)
    pub total_latency_ns: AtomicU64,
}

impl ProbeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self) {
        self.dispatched.increment();
    }

    pub fn record_success(&self, latency: Duration) {
        self.succeeded.increment();
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self, kind: &str) {
        self.failed.increment();
        trace!(probe_op = "failure", kind = kind);
    }

    pub fn record_cancelled_batch(&self) {
        self.cancelled_batches.fetch_add(1, Ordering::Relaxed);
    }

    /// Calculate average probe latency in milliseconds
    pub fn avg_latency_ms(&self) -> f64 {
        let count = self.succeeded.sum();
        if count == 0 {
            return 0.0;
        }
        let total_ns = self.total_latency_ns.load(Ordering::Relaxed);
        (total_ns as f64 / count as f64) / 1_000_000.0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.dispatched.sum();
        if total == 0 {
            return 100.0;
        }
        (self.succeeded.sum() as f64 / total as f64) * 100.0
    }

    /// Log a summary of probe metrics
    pub fn log_summary(&self) {
        info!(
            operation = "probe_metrics_summary",
            dispatched = self.dispatched.sum(),
            succeeded = self.succeeded.sum(),
            failed = self.failed.sum(),
            cancelled_batches = self.cancelled_batches.load(Ordering::Relaxed),
            success_rate_pct = self.success_rate(),
            avg_latency_ms = self.avg_latency_ms(),
        );
    }
}

/// Combined metrics for the entire system
#[derive(Debug)]
pub struct Metrics {
    pub store: Arc<StoreMetrics>,
    pub probe: Arc<ProbeMetrics>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            store: Arc::new(StoreMetrics::new()),
            probe: Arc::new(ProbeMetrics::new()),
            start_time: Instant::now(),
        }
    }

    /// Log a complete metrics summary
    pub fn log_full_summary(&self) {
        info!(
            uptime_secs = self.start_time.elapsed().as_secs_f64(),
            "=== pathrank metrics summary ==="
        );
        self.store.log_summary();
        self.probe.log_summary();
    }

    /// Get elapsed time since metrics creation
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
