use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    pages_fetched: AtomicU64,
    records_scanned: AtomicU64,
    records_updated: AtomicU64,
    records_present: AtomicU64,
    records_pending: AtomicU64,
    conflict_count: AtomicU64,
    retry_count: AtomicU64,
}

/// Run counters, shared between the runner and the page reader.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub pages_fetched: u64,
    pub records_scanned: u64,
    pub records_updated: u64,
    /// Records that already had the attribute.
    pub records_present: u64,
    /// Records lacking the attribute that a dry run left untouched.
    pub records_pending: u64,
    /// Conditional updates that lost against a concurrent writer.
    pub conflict_count: u64,
    pub retry_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_pages(&self, count: u64) {
        self.inner.pages_fetched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_scanned(&self, count: u64) {
        self.inner
            .records_scanned
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_updated(&self, count: u64) {
        self.inner
            .records_updated
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_present(&self, count: u64) {
        self.inner
            .records_present
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_pending(&self, count: u64) {
        self.inner
            .records_pending
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self, count: u64) {
        self.inner.conflict_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_retries(&self, count: u64) {
        self.inner.retry_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_fetched: self.inner.pages_fetched.load(Ordering::Relaxed),
            records_scanned: self.inner.records_scanned.load(Ordering::Relaxed),
            records_updated: self.inner.records_updated.load(Ordering::Relaxed),
            records_present: self.inner.records_present.load(Ordering::Relaxed),
            records_pending: self.inner.records_pending.load(Ordering::Relaxed),
            conflict_count: self.inner.conflict_count.load(Ordering::Relaxed),
            retry_count: self.inner.retry_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
