//! # Memoizing Decorators
//!
//! [`Memoize`] caches every result of the wrapped callable in a
//! [`BoundedCache`]; [`TryMemoize`] does the same for callables returning
//! `Result`, storing only `Ok` values so failures are retried on the next
//! call.
//!
//! ## Call Flow
//!
//! ```text
//!   call(args)
//!     │
//!     ├── args.cache_key() == None ──────────► inner.call(args)   (bypass)
//!     │
//!     ├── lock ─► cache.get(key) ── hit ─────► clone of stored value
//!     │   unlock        │
//!     │                miss
//!     │                 ▼
//!     ├── inner.call(args)                    (lock NOT held)
//!     │
//!     └── lock ─► cache.insert(key, value) ─► maybe evict ─► unlock ─► value
//! ```
//!
//! The lock is released while the wrapped function runs, so a recursive
//! function can re-enter its own memoizer (see
//! [`recursive`](crate::function::recursive)). If another thread stored the
//! same key in the meantime, its entry is kept and this call's value is
//! returned; for a pure function both are equal.
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use memokit::decorator::memoize::Memoize;
//! use memokit::function::Function;
//! use memokit::traits::Callable;
//!
//! let calls = AtomicUsize::new(0);
//! let square = Memoize::new(Function::new("square", |x: u64| {
//!     calls.fetch_add(1, Ordering::Relaxed);
//!     x * x
//! }));
//!
//! assert_eq!(square.call(4), 16);
//! assert_eq!(square.call(4), 16);
//! assert_eq!(calls.load(Ordering::Relaxed), 1);
//! assert_eq!(square.hit_count(&4), Some(1));
//! ```

use std::fmt;
use std::marker::PhantomData;

use parking_lot::Mutex;
use tracing::trace;

use crate::builder::{CacheConfig, MemoizeBuilder};
use crate::cache::BoundedCache;
use crate::error::ConfigError;
use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::MemoMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MemoMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::Callable;

/// Result-like outputs whose success value can be memoized on its own.
pub trait Fallible {
    type Ok;
    type Err;

    fn into_result(self) -> Result<Self::Ok, Self::Err>;
    fn from_result(result: Result<Self::Ok, Self::Err>) -> Self;
}

impl<T, E> Fallible for Result<T, E> {
    type Ok = T;
    type Err = E;

    #[inline]
    fn into_result(self) -> Result<T, E> {
        self
    }

    #[inline]
    fn from_result(result: Result<T, E>) -> Self {
        result
    }
}

// ---------------------------------------------------------------------------
// Shared memo table
// ---------------------------------------------------------------------------

/// A [`BoundedCache`] behind a mutex, plus the lookup/store steps both
/// memoizers share.
struct MemoTable<K, V>
where
    K: Eq + std::hash::Hash,
{
    cache: Mutex<BoundedCache<K, V>>,
}

impl<K, V> MemoTable<K, V>
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    fn lookup(&self, key: &K) -> Option<V> {
        self.cache.lock().get(key).cloned()
    }

    fn store(&self, name: &str, key: K, value: V) {
        let mut cache = self.cache.lock();
        let evicted = cache.insert(key, value);
        if evicted > 0 {
            trace!(function = name, evicted, len = cache.len(), "memo table evicted");
        }
    }

    #[cfg(feature = "metrics")]
    fn record_bypass(&self) {
        self.cache.lock().metrics_mut().record_bypass();
    }

    #[cfg(feature = "metrics")]
    fn record_uncached_failure(&self) {
        self.cache.lock().metrics_mut().record_uncached_failure();
    }
}

impl<K, V> MemoTable<K, V>
where
    K: Eq + std::hash::Hash,
{
    fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            cache: Mutex::new(BoundedCache::try_new(config.capacity, config.policy)?),
        })
    }

    fn config(&self) -> CacheConfig {
        let cache = self.cache.lock();
        CacheConfig::new(cache.capacity(), cache.policy())
    }

    fn with_cache<R>(&self, f: impl FnOnce(&BoundedCache<K, V>) -> R) -> R {
        f(&self.cache.lock())
    }

    fn clear(&self) {
        self.cache.lock().clear();
    }
}

// ---------------------------------------------------------------------------
// Memoize
// ---------------------------------------------------------------------------

/// Memoizes every result of `C`.
///
/// # Errors
///
/// `Memoize` stores whatever `C` returns, `Err` included: a `Result`
/// output that failed once keeps failing from the table, and a [`Retry`]
/// around it only ever sees the stored `Err`. Wrap `Result`-returning
/// callables in [`TryMemoize`], which stores only `Ok` values. A panic in
/// `C` leaves no entry behind.
///
/// [`Retry`]: crate::decorator::retry::Retry
pub struct Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
{
    inner: C,
    table: MemoTable<A::Key, C::Output>,
    _args: PhantomData<fn(A)>,
}

impl<C, A> Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
{
    /// Memoizes `inner` with the default configuration (capacity 5,
    /// `LeastAccessed`).
    pub fn new(inner: C) -> Self {
        match Self::with_config(inner, CacheConfig::default()) {
            Ok(memo) => memo,
            Err(e) => panic!("{}", e),
        }
    }

    /// Memoizes `inner` without a size bound, never evicting.
    pub fn unbounded(inner: C) -> Self {
        match MemoizeBuilder::new().unbounded().try_build(inner) {
            Ok(memo) => memo,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn builder() -> MemoizeBuilder {
        MemoizeBuilder::new()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn with_config(inner: C, config: CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner,
            table: MemoTable::new(config)?,
            _args: PhantomData,
        })
    }
}

impl<C, A> Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
{
    /// Number of memoized results currently held.
    pub fn cache_len(&self) -> usize {
        self.table.with_cache(|cache| cache.len())
    }

    /// Returns `true` if the result for `args` is memoized. Does not count
    /// as an access.
    pub fn contains_key(&self, args: &A) -> bool {
        match args.cache_key() {
            Some(key) => self.table.with_cache(|cache| cache.contains(&key)),
            None => false,
        }
    }

    /// Hits recorded for the entry of `args`, if it is memoized.
    pub fn hit_count(&self, args: &A) -> Option<u64> {
        let key = args.cache_key()?;
        self.table
            .with_cache(|cache| cache.entry(&key).map(|entry| entry.hit_count()))
    }

    /// Runs `f` with read-only access to the underlying cache.
    ///
    /// The memoizer's lock is held while `f` runs; do not call this
    /// memoizer from inside it.
    pub fn with_cache<R>(&self, f: impl FnOnce(&BoundedCache<A::Key, C::Output>) -> R) -> R {
        self.table.with_cache(f)
    }

    pub fn config(&self) -> CacheConfig {
        self.table.config()
    }

    /// Forgets every memoized result. Counters keep growing from where
    /// they were.
    pub fn clear(&self) {
        self.table.clear();
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        self.table.with_cache(|cache| cache.metrics_snapshot())
    }
}

impl<C, A> Callable<A> for Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Clone,
{
    type Output = C::Output;

    fn call(&self, args: A) -> C::Output {
        let Some(key) = args.cache_key() else {
            #[cfg(feature = "metrics")]
            self.table.record_bypass();
            trace!(function = self.inner.name(), "uncacheable argument, bypassing memo table");
            return self.inner.call(args);
        };

        if let Some(value) = self.table.lookup(&key) {
            return value;
        }

        let value = self.inner.call(args);
        self.table.store(self.inner.name(), key, value.clone());
        value
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<C, A> fmt::Debug for Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.table.config();
        f.debug_struct("Memoize")
            .field("name", &self.inner.name())
            .field("capacity", &config.capacity)
            .field("policy", &config.policy)
            .field("len", &self.table.with_cache(|cache| cache.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TryMemoize
// ---------------------------------------------------------------------------

/// Memoizes the `Ok` results of a fallible `C`.
///
/// `Err` results pass through unchanged and leave no entry, so the next
/// call with the same argument runs the wrapped function again.
pub struct TryMemoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Fallible,
{
    inner: C,
    table: MemoTable<A::Key, <C::Output as Fallible>::Ok>,
    _args: PhantomData<fn(A)>,
}

impl<C, A> TryMemoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Fallible,
{
    /// Memoizes `inner` with the default configuration.
    pub fn new(inner: C) -> Self {
        match Self::with_config(inner, CacheConfig::default()) {
            Ok(memo) => memo,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn builder() -> MemoizeBuilder {
        MemoizeBuilder::new()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn with_config(inner: C, config: CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner,
            table: MemoTable::new(config)?,
            _args: PhantomData,
        })
    }
}

impl<C, A> TryMemoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Fallible,
{
    /// Number of memoized `Ok` results currently held.
    pub fn cache_len(&self) -> usize {
        self.table.with_cache(|cache| cache.len())
    }

    pub fn contains_key(&self, args: &A) -> bool {
        match args.cache_key() {
            Some(key) => self.table.with_cache(|cache| cache.contains(&key)),
            None => false,
        }
    }

    pub fn hit_count(&self, args: &A) -> Option<u64> {
        let key = args.cache_key()?;
        self.table
            .with_cache(|cache| cache.entry(&key).map(|entry| entry.hit_count()))
    }

    pub fn with_cache<R>(
        &self,
        f: impl FnOnce(&BoundedCache<A::Key, <C::Output as Fallible>::Ok>) -> R,
    ) -> R {
        self.table.with_cache(f)
    }

    pub fn config(&self) -> CacheConfig {
        self.table.config()
    }

    pub fn clear(&self) {
        self.table.clear();
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MemoMetricsSnapshot {
        self.table.with_cache(|cache| cache.metrics_snapshot())
    }
}

impl<C, A> Callable<A> for TryMemoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Fallible,
    <C::Output as Fallible>::Ok: Clone,
{
    type Output = C::Output;

    fn call(&self, args: A) -> C::Output {
        let Some(key) = args.cache_key() else {
            #[cfg(feature = "metrics")]
            self.table.record_bypass();
            trace!(function = self.inner.name(), "uncacheable argument, bypassing memo table");
            return self.inner.call(args);
        };

        if let Some(value) = self.table.lookup(&key) {
            return C::Output::from_result(Ok(value));
        }

        match self.inner.call(args).into_result() {
            Ok(value) => {
                self.table.store(self.inner.name(), key, value.clone());
                C::Output::from_result(Ok(value))
            },
            Err(err) => {
                #[cfg(feature = "metrics")]
                self.table.record_uncached_failure();
                C::Output::from_result(Err(err))
            },
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<C, A> fmt::Debug for TryMemoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Fallible,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.table.config();
        f.debug_struct("TryMemoize")
            .field("name", &self.inner.name())
            .field("capacity", &config.capacity)
            .field("policy", &config.policy)
            .field("len", &self.table.with_cache(|cache| cache.len()))
            .finish()
    }
}

#[cfg(feature = "metrics")]
impl<C, A> MetricsSnapshotProvider<MemoMetricsSnapshot> for Memoize<C, A>
where
    A: CacheKey,
    C: Callable<A>,
    C::Output: Clone,
{
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::retry::{Retry, RetryNTimes};
    use crate::error::PreconditionError;
    use crate::function::Function;
    use crate::key::Uncacheable;
    use crate::policy::EvictionPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_square(calls: &AtomicUsize) -> Function<impl Fn(u64) -> u64 + '_> {
        Function::new("square", move |x: u64| {
            calls.fetch_add(1, Ordering::Relaxed);
            x * x
        })
    }

    // ==============================================
    // Hit and miss behavior
    // ==============================================

    mod basic_behavior {
        use super::*;

        #[test]
        fn repeated_argument_runs_once() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(counting_square(&calls));

            assert_eq!(square.call(3), 9);
            assert_eq!(square.call(3), 9);
            assert_eq!(square.call(3), 9);
            assert_eq!(calls.load(Ordering::Relaxed), 1);
            assert_eq!(square.hit_count(&3), Some(2));
        }

        #[test]
        fn name_is_forwarded() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(counting_square(&calls));
            assert_eq!(square.name(), "square");
        }

        #[test]
        fn default_config_is_five_least_accessed() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(counting_square(&calls));
            assert_eq!(
                square.config(),
                CacheConfig::new(5, EvictionPolicy::LeastAccessed)
            );
        }

        #[test]
        fn uncacheable_argument_bypasses_table() {
            let calls = AtomicUsize::new(0);
            let len = Memoize::new(Function::new("len", |v: Uncacheable<Vec<f64>>| {
                calls.fetch_add(1, Ordering::Relaxed);
                v.0.len()
            }));

            assert_eq!(len.call(Uncacheable(vec![1.0, 2.0])), 2);
            assert_eq!(len.call(Uncacheable(vec![1.0, 2.0])), 2);
            assert_eq!(calls.load(Ordering::Relaxed), 2);
            assert_eq!(len.cache_len(), 0);
            assert!(!len.contains_key(&Uncacheable(vec![])));
        }

        #[test]
        fn clear_forces_recomputation() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(counting_square(&calls));
            square.call(2);
            square.clear();
            assert_eq!(square.cache_len(), 0);
            square.call(2);
            assert_eq!(calls.load(Ordering::Relaxed), 2);
        }

        #[test]
        fn unbounded_never_evicts() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::unbounded(counting_square(&calls));
            for x in 0..100 {
                square.call(x);
            }
            assert_eq!(square.cache_len(), 100);
        }
    }

    // ==============================================
    // Eviction through the decorator
    // ==============================================

    mod eviction {
        use super::*;

        #[test]
        fn least_inserted_evicts_oldest_even_after_hit() {
            let calls = AtomicUsize::new(0);
            let square = MemoizeBuilder::new()
                .capacity(2)
                .policy(EvictionPolicy::LeastInserted)
                .build(counting_square(&calls));

            assert_eq!(square.call(2), 4);
            assert_eq!(square.call(3), 9);
            assert_eq!(square.call(2), 4);
            assert_eq!(square.call(4), 16);

            assert!(!square.contains_key(&2));
            assert!(square.contains_key(&3));
            assert!(square.contains_key(&4));

            assert_eq!(square.call(2), 4);
            assert_eq!(calls.load(Ordering::Relaxed), 4);
        }

        #[test]
        fn least_accessed_keeps_recently_hit_entry() {
            let calls = AtomicUsize::new(0);
            let square = MemoizeBuilder::new()
                .capacity(2)
                .policy(EvictionPolicy::LeastAccessed)
                .build(counting_square(&calls));

            square.call(2);
            square.call(3);
            square.call(2);
            square.call(4);

            assert!(square.contains_key(&2));
            assert!(!square.contains_key(&3));
            assert!(square.contains_key(&4));
        }

        #[test]
        fn least_hit_tie_clears_fresh_entries() {
            let calls = AtomicUsize::new(0);
            let square = MemoizeBuilder::new()
                .capacity(2)
                .policy(EvictionPolicy::LeastHit)
                .build(counting_square(&calls));

            assert_eq!(square.call(1), 1);
            assert_eq!(square.call(2), 4);
            assert_eq!(square.call(3), 9);
            assert_eq!(square.cache_len(), 0);
        }

        #[test]
        fn with_cache_exposes_ranks() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(counting_square(&calls));
            square.call(5);
            square.call(5);

            let (insertion, access) = square.with_cache(|cache| {
                let entry = cache.entry(&5).unwrap();
                (entry.insertion_order(), entry.access_order())
            });
            assert_eq!(insertion, 0);
            assert_eq!(access, 1);
        }
    }

    // ==============================================
    // Fallible memoization
    // ==============================================

    mod fallible {
        use super::*;

        #[test]
        fn errors_are_not_stored() {
            let calls = AtomicUsize::new(0);
            let parse = TryMemoize::new(Function::new("parse", |s: String| {
                calls.fetch_add(1, Ordering::Relaxed);
                s.parse::<i32>()
            }));

            assert!(parse.call("x".to_string()).is_err());
            assert!(parse.call("x".to_string()).is_err());
            assert_eq!(calls.load(Ordering::Relaxed), 2);
            assert_eq!(parse.cache_len(), 0);

            assert_eq!(parse.call("7".to_string()), Ok(7));
            assert_eq!(parse.call("7".to_string()), Ok(7));
            assert_eq!(calls.load(Ordering::Relaxed), 3);
            assert_eq!(parse.hit_count(&"7".to_string()), Some(1));
        }

        #[test]
        fn retry_recovers_after_one_failure() {
            let calls = AtomicUsize::new(0);
            let flaky = TryMemoize::new(Function::new("flaky", |x: u32| {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Err("transient")
                } else {
                    Ok(x + 1)
                }
            }));
            let retried = Retry::new(&flaky, RetryNTimes::default());

            assert_eq!(retried.call(1), Ok(2));
            assert_eq!(calls.load(Ordering::Relaxed), 2);
            assert!(flaky.contains_key(&1));
        }

        #[test]
        fn plain_memoize_replays_stored_err() {
            let calls = AtomicUsize::new(0);
            let flaky = Memoize::new(Function::new("flaky", |x: u32| {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Err("transient")
                } else {
                    Ok(x + 1)
                }
            }));
            let retried = Retry::new(&flaky, RetryNTimes::default());

            // The first Err is stored, so every retry is a hit on it.
            assert_eq!(retried.call(1), Err("transient"));
            assert_eq!(calls.load(Ordering::Relaxed), 1);
            assert_eq!(flaky.hit_count(&1), Some(2));
        }

        #[test]
        fn err_then_ok_is_not_shadowed() {
            let calls = AtomicUsize::new(0);
            let guarded = TryMemoize::new(Function::new("three", |_: u8| {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Err(PreconditionError::default())
                } else {
                    Ok(3)
                }
            }));

            assert_eq!(guarded.call(0), Err(PreconditionError::default()));
            assert_eq!(guarded.call(0), Ok(3));
            assert_eq!(guarded.call(0), Ok(3));
            assert_eq!(calls.load(Ordering::Relaxed), 2);
        }

        #[test]
        fn builder_builds_fallible() {
            let parse = MemoizeBuilder::new()
                .capacity(1)
                .build_fallible(Function::new("parse", |s: String| s.parse::<u8>()));
            assert_eq!(parse.call("1".to_string()), Ok(1));
            assert_eq!(parse.call("2".to_string()), Ok(2));
            assert_eq!(parse.cache_len(), 1);
        }
    }

    // ==============================================
    // Panicking wrapped function
    // ==============================================

    mod panics {
        use super::*;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        #[test]
        fn panic_leaves_no_entry_and_releases_lock() {
            let calls = AtomicUsize::new(0);
            let square = Memoize::new(Function::new("square", |x: u64| {
                if calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    panic!("first call fails");
                }
                x * x
            }));

            let result = catch_unwind(AssertUnwindSafe(|| square.call(3)));
            assert!(result.is_err());

            // Reading the table would deadlock if the unwind had kept the lock.
            assert_eq!(square.cache_len(), 0);
            let counters =
                square.with_cache(|cache| (cache.insertion_counter(), cache.access_counter()));
            assert_eq!(counters, (0, 0));

            assert_eq!(square.call(3), 9);
            assert_eq!(calls.load(Ordering::Relaxed), 2);
            assert!(square.contains_key(&3));
            let counters =
                square.with_cache(|cache| (cache.insertion_counter(), cache.access_counter()));
            assert_eq!(counters, (1, 1));
        }
    }

    // ==============================================
    // Concurrency
    // ==============================================

    mod concurrency {
        use super::*;
        use std::sync::Arc;
        use std::thread;

        #[test]
        fn shared_memoizer_returns_consistent_values() {
            let memo = Arc::new(MemoizeBuilder::new().capacity(16).build(Function::new(
                "cube",
                |x: u64| x * x * x,
            )));

            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let memo = Arc::clone(&memo);
                    thread::spawn(move || {
                        for x in 0..32u64 {
                            assert_eq!(memo.call(x), x * x * x);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert!(memo.cache_len() <= 16);
            #[cfg(debug_assertions)]
            memo.with_cache(|cache| cache.check_invariants()).unwrap();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_counts_hits_misses_and_bypasses() {
            let memo = Memoize::new(Function::new("id", |x: Option<Uncacheable<u8>>| {
                x.map(|u| u.0)
            }));
            memo.call(None);
            memo.call(Some(Uncacheable(1)));
            memo.call(None);

            let snapshot = memo.metrics_snapshot();
            assert_eq!(snapshot.get_misses, 1);
            assert_eq!(snapshot.get_hits, 1);
            assert_eq!(snapshot.bypasses, 1);
        }
    }
}
