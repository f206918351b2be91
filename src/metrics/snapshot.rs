use std::fmt;

/// Point-in-time copy of a memo table's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoMetricsSnapshot {
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

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl MemoMetricsSnapshot {
    /// Keyed lookups (hits plus misses); bypassed calls are not lookups.
    pub fn lookups(&self) -> u64 {
        self.get_hits + self.get_misses
    }

    /// Fraction of keyed lookups served from the cache, or `0.0` before the
    /// first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            0.0
        } else {
            self.get_hits as f64 / lookups as f64
        }
    }
}

impl fmt::Display for MemoMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemoMetrics {{ hits: {}, misses: {}, hit_rate: {:.2}%, bypasses: {}, inserts: {}, \
             evictions: {}/{}, uncached_failures: {}, len: {}/{} }}",
            self.get_hits,
            self.get_misses,
            self.hit_rate() * 100.0,
            self.bypasses,
            self.insert_new,
            self.evicted_entries,
            self.evict_calls,
            self.uncached_failures,
            self.cache_len,
            self.capacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_without_lookups() {
        let snapshot = MemoMetricsSnapshot {
            bypasses: 4,
            ..Default::default()
        };
        assert_eq!(snapshot.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_ignores_bypasses() {
        let snapshot = MemoMetricsSnapshot {
            get_hits: 3,
            get_misses: 1,
            bypasses: 100,
            ..Default::default()
        };
        assert_eq!(snapshot.lookups(), 4);
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn display_includes_hit_rate() {
        let snapshot = MemoMetricsSnapshot {
            get_hits: 1,
            get_misses: 1,
            ..Default::default()
        };
        assert!(snapshot.to_string().contains("hit_rate: 50.00%"));
    }
}
