//! # Bounded Cache
//!
//! Size-bounded lookup table backing [`Memoize`](crate::decorator::memoize::Memoize).
//! Every entry carries three ranks; the configured [`EvictionPolicy`] picks
//! one of them when an insertion pushes the table past capacity.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        BoundedCache<K, V>                            │
//!   │                                                                      │
//!   │   entries: FxHashMap<K, CacheEntry<V>>                               │
//!   │                                                                      │
//!   │   ┌───────┬───────┬─────────────────┬──────────────┬───────────┐     │
//!   │   │  Key  │ Value │ insertion_order │ access_order │ hit_count │     │
//!   │   ├───────┼───────┼─────────────────┼──────────────┼───────────┤     │
//!   │   │   3   │   9   │        1        │      1       │     0     │     │
//!   │   │   2   │   4   │        0        │      2       │     1     │     │
//!   │   └───────┴───────┴─────────────────┴──────────────┴───────────┘     │
//!   │                                                                      │
//!   │   insertion_counter: 2     access_counter: 3                         │
//!   │   capacity: usize          policy: EvictionPolicy                    │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counters
//!
//! Both counters belong to the cache instance and only ever grow:
//!
//! - `insertion_counter` is stamped onto each new entry, then incremented.
//! - `access_counter` is stamped onto an entry on insertion and on every
//!   hit, then incremented.
//!
//! Ranking by counters instead of wall-clock time keeps eviction order
//! deterministic.
//!
//! ## Eviction Flow
//!
//! ```text
//!   insert(key, value)
//!        │
//!        ▼
//!   len() > capacity ? ── no ──► done
//!        │ yes
//!        ▼
//!   rank = insertion_order | access_order | hit_count   (per policy)
//!   min  = lowest rank across all entries
//!   remove EVERY entry with rank == min                 (single pass)
//! ```
//!
//! Ties are evicted together. Under `LeastHit` every fresh entry ranks 0,
//! so one pass can remove several entries, including the one just
//! inserted, and leave the cache well below capacity. No second pass runs.
//!
//! ## Example
//!
//! ```
//! use memokit::cache::BoundedCache;
//! use memokit::policy::EvictionPolicy;
//!
//! let mut cache = BoundedCache::new(2, EvictionPolicy::LeastInserted);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.insert("c", 3);
//!
//! assert!(!cache.contains(&"a"));
//! assert_eq!(cache.get(&"b"), Some(&2));
//! assert_eq!(cache.entry(&"b").map(|e| e.hit_count()), Some(1));
//! ```
//!
//! ## Thread Safety
//!
//! `BoundedCache` is **not** synchronized; `Memoize` keeps it behind a
//! `parking_lot::Mutex`.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::ConfigError;
#[cfg(debug_assertions)]
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::MemoMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::MemoMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MemoMetricsRecorder, MetricsSnapshotProvider};
use crate::policy::EvictionPolicy;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 5;

/// One memoized result and its eviction ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    value: V,
    insertion_order: u64,
    access_order: u64,
    hit_count: u64,
}

impl<V> CacheEntry<V> {
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Insertion counter value stamped when the entry was created.
    #[inline]
    pub fn insertion_order(&self) -> u64 {
        self.insertion_order
    }

    /// Access counter value stamped on the most recent insertion or hit.
    #[inline]
    pub fn access_order(&self) -> u64 {
        self.access_order
    }

    /// Number of lookups this entry has satisfied.
    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    #[inline]
    fn rank(&self, policy: EvictionPolicy) -> u64 {
        match policy {
            EvictionPolicy::LeastInserted => self.insertion_order,
            EvictionPolicy::LeastAccessed => self.access_order,
            EvictionPolicy::LeastHit => self.hit_count,
        }
    }
}

/// Size-bounded memo table with rank-based eviction.
#[derive(Debug)]
pub struct BoundedCache<K, V>
where
    K: Eq + Hash,
{
    entries: FxHashMap<K, CacheEntry<V>>,
    capacity: usize,
    policy: EvictionPolicy,
    insertion_counter: u64,
    access_counter: u64,
    #[cfg(feature = "metrics")]
    metrics: MemoMetrics,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) for a
    /// non-panicking alternative.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        match Self::try_new(capacity, policy) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error instead of panicking on a zero
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize, policy: EvictionPolicy) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        // Unbounded caches start small and grow on demand.
        let prealloc = capacity.min(1024);
        Ok(Self {
            entries: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            capacity,
            policy,
            insertion_counter: 0,
            access_counter: 0,
            #[cfg(feature = "metrics")]
            metrics: MemoMetrics::default(),
        })
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX, EvictionPolicy::default())
    }

    /// Looks up `key`, recording a hit on success.
    ///
    /// A hit stamps the entry with the current access counter, bumps the
    /// counter, and increments the entry's hit count.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(entry) = self.entries.get_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        entry.access_order = self.access_counter;
        self.access_counter += 1;
        entry.hit_count += 1;

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        Some(&entry.value)
    }

    /// Looks up `key` without touching any counter.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Read-only view of the entry for `key`, including its ranks.
    #[inline]
    pub fn entry(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Inserts a freshly computed value and evicts if over capacity.
    ///
    /// Returns the number of entries evicted. If `key` is already present
    /// the existing entry is kept untouched, `value` is dropped, and no
    /// counter moves.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.entries.contains_key(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            return 0;
        }

        let entry = CacheEntry {
            value,
            insertion_order: self.insertion_counter,
            access_order: self.access_counter,
            hit_count: 0,
        };
        self.insertion_counter += 1;
        self.access_counter += 1;
        self.entries.insert(key, entry);

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.entries.len() > self.capacity {
            self.evict()
        } else {
            0
        }
    }

    /// Removes every entry sharing the minimum rank under the policy.
    fn evict(&mut self) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let policy = self.policy;
        let Some(min_rank) = self.entries.values().map(|entry| entry.rank(policy)).min() else {
            return 0;
        };

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.rank(policy) != min_rank);
        let evicted = before - self.entries.len();

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entries(evicted as u64);

        if evicted > 1 {
            debug!(
                policy = %policy,
                rank = min_rank,
                evicted,
                remaining = self.entries.len(),
                capacity = self.capacity,
                "evicted tied entries"
            );
        } else {
            trace!(policy = %policy, rank = min_rank, "evicted entry");
        }

        evicted
    }

    /// Returns `true` if `key` has an entry. Does not count as an access.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Next insertion counter value.
    #[inline]
    pub fn insertion_counter(&self) -> u64 {
        self.insertion_counter
    }

    /// Next access counter value.
    #[inline]
    pub fn access_counter(&self) -> u64 {
        self.access_counter
    }

    /// Iterates over the cached keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterates over keys and entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.entries.iter()
    }

    /// Drops every entry. Counters keep their values so that ranks stay
    /// unique across the cache's lifetime.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.entries.clear();
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn metrics_mut(&mut self) -> &mut MemoMetrics {
        &mut self.metrics
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics.snapshot(self.entries.len(), self.capacity)
    }

    /// Verifies the structural invariants of the cache.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first violated invariant.
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "entry count {} exceeds capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }

        let mut insertion_orders: Vec<u64> = Vec::with_capacity(self.entries.len());
        let mut access_orders: Vec<u64> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.values() {
            if entry.insertion_order >= self.insertion_counter {
                return Err(InvariantError::new(format!(
                    "insertion order {} not below counter {}",
                    entry.insertion_order, self.insertion_counter
                )));
            }
            if entry.access_order >= self.access_counter {
                return Err(InvariantError::new(format!(
                    "access order {} not below counter {}",
                    entry.access_order, self.access_counter
                )));
            }
            if entry.access_order < entry.insertion_order {
                // Each insertion bumps both counters, so access never lags
                // insertion for the same entry.
                return Err(InvariantError::new(format!(
                    "access order {} behind insertion order {}",
                    entry.access_order, entry.insertion_order
                )));
            }
            insertion_orders.push(entry.insertion_order);
            access_orders.push(entry.access_order);
        }

        insertion_orders.sort_unstable();
        access_orders.sort_unstable();
        if insertion_orders.windows(2).any(|w| w[0] == w[1]) {
            return Err(InvariantError::new("duplicate insertion order"));
        }
        if access_orders.windows(2).any(|w| w[0] == w[1]) {
            return Err(InvariantError::new("duplicate access order"));
        }

        Ok(())
    }
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, EvictionPolicy::default())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<MemoMetricsSnapshot> for BoundedCache<K, V>
where
    K: Eq + Hash,
{
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics_snapshot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
