use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::MemoMetricsRecorder;

/// Counters owned by a [`BoundedCache`](crate::cache::BoundedCache).
///
/// Mutated only through `&mut`, under the memoizer's lock.
#[derive(Debug, Default, Clone)]
pub struct MemoMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub bypasses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub uncached_failures: u64,
    pub clears: u64,
}

impl MemoMetrics {
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> MemoMetricsSnapshot {
        MemoMetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            bypasses: self.bypasses,
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_rejected: self.insert_rejected,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            uncached_failures: self.uncached_failures,
            clears: self.clears,
            cache_len,
            capacity,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl MemoMetricsRecorder for MemoMetrics {
    #[inline]
    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    fn record_bypass(&mut self) {
        self.bypasses += 1;
    }

    #[inline]
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    #[inline]
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    #[inline]
    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    #[inline]
    fn record_evicted_entries(&mut self, count: u64) {
        self.evicted_entries += count;
    }

    #[inline]
    fn record_uncached_failure(&mut self) {
        self.uncached_failures += 1;
    }

    #[inline]
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}
