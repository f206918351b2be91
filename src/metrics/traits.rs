//! # Metrics Traits
//!
//! Recorders only write counters; providers only read and snapshot;
//! exporters only publish. Keeping the three apart lets the cache record
//! cheaply under its lock while monitoring code works on plain snapshots.

/// Counters recorded by a memo table.
pub trait MemoMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    /// Argument had no cache key; the wrapped function ran directly.
    fn record_bypass(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    /// Key was already present (a concurrent caller stored it first).
    fn record_insert_rejected(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entries(&mut self, count: u64);
    /// Wrapped function returned an error, so nothing was stored.
    fn record_uncached_failure(&mut self);
    fn record_clear(&mut self);
}

/// Produce a point-in-time snapshot of metrics.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publish a snapshot to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
