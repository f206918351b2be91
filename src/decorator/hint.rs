//! Recursion-depth hints.
//!
//! [`Hint`] counts how many of its own calls are active on the current
//! thread. When the count after entering exceeds `max_recursion`, it
//! reports a hint to its sink and carries on; it never blocks or fails the
//! call.
//!
//! ## Depth Tracking
//!
//! ```text
//!   thread_local DEPTHS: FxHashMap<instance id, depth>
//!
//!   call(args)
//!     depth = DEPTHS[id] += 1
//!     depth > max ? ──► sink.on_recursion_hint(name, depth, max)
//!     DepthGuard ──────► inner.call(args)
//!     drop(DepthGuard) ► DEPTHS[id] -= 1   (also on unwind)
//! ```
//!
//! Each instance draws a process-unique id, so two hinted functions on the
//! same thread count independently. Depths live in thread-local storage,
//! so threads never share a counter and no lock is taken.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::sink::{EventSink, TracingSink};
use crate::traits::Callable;

/// Depth above which a hint is reported by default.
pub const DEFAULT_MAX_RECURSION: usize = 5;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static DEPTHS: RefCell<FxHashMap<u64, usize>> = RefCell::new(FxHashMap::default());
}

fn depth_of(id: u64) -> usize {
    DEPTHS.with(|depths| depths.borrow().get(&id).copied().unwrap_or(0))
}

/// Decrements this thread's depth for one instance when dropped.
struct DepthGuard {
    id: u64,
}

impl DepthGuard {
    fn enter(id: u64) -> (Self, usize) {
        let depth = DEPTHS.with(|depths| {
            let mut depths = depths.borrow_mut();
            let depth = depths.entry(id).or_insert(0);
            *depth += 1;
            *depth
        });
        (Self { id }, depth)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be torn down at thread exit.
        let _ = DEPTHS.try_with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(depth) = depths.get_mut(&self.id) {
                *depth -= 1;
                if *depth == 0 {
                    depths.remove(&self.id);
                }
            }
        });
    }
}

/// Reports when its own calls nest deeper than `max_recursion`.
pub struct Hint<C, S = TracingSink> {
    inner: C,
    sink: S,
    recursion: bool,
    max_recursion: usize,
    id: u64,
}

impl<C> Hint<C> {
    pub fn new(inner: C) -> Self {
        Self::with_sink(inner, TracingSink)
    }
}

impl<C, S> Hint<C, S> {
    pub fn with_sink(inner: C, sink: S) -> Self {
        Self {
            inner,
            sink,
            recursion: true,
            max_recursion: DEFAULT_MAX_RECURSION,
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Enables or disables recursion hints.
    pub fn recursion(mut self, enabled: bool) -> Self {
        self.recursion = enabled;
        self
    }

    pub fn max_recursion(mut self, max: usize) -> Self {
        self.max_recursion = max;
        self
    }

    pub fn recursion_enabled(&self) -> bool {
        self.recursion
    }

    pub fn max_recursion_limit(&self) -> usize {
        self.max_recursion
    }

    /// Number of this instance's calls active on the current thread.
    pub fn current_depth(&self) -> usize {
        depth_of(self.id)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: fmt::Debug, S> fmt::Debug for Hint<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hint")
            .field("inner", &self.inner)
            .field("recursion", &self.recursion)
            .field("max_recursion", &self.max_recursion)
            .finish()
    }
}

impl<A, C, S> Callable<A> for Hint<C, S>
where
    C: Callable<A>,
    S: EventSink,
{
    type Output = C::Output;

    fn call(&self, args: A) -> C::Output {
        let (_guard, depth) = DepthGuard::enter(self.id);
        if self.recursion && depth > self.max_recursion {
            self.sink
                .on_recursion_hint(self.inner.name(), depth, self.max_recursion);
        }
        self.inner.call(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Function, recursive};
    use crate::sink::RecordingSink;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;

    fn countdown(
        sink: Arc<RecordingSink>,
        max: usize,
    ) -> Arc<Hint<impl Callable<u32, Output = u32>, Arc<RecordingSink>>> {
        recursive(
            "countdown",
            |this, n: u32| -> u32 { if n == 0 { 0 } else { 1 + this.call(n - 1) } },
            move |body| Hint::with_sink(body, sink).max_recursion(max),
        )
    }

    #[test]
    fn shallow_calls_emit_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let f = countdown(Arc::clone(&sink), 5);
        assert_eq!(f.call(4), 4);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn hints_fire_for_each_level_above_max() {
        let sink = Arc::new(RecordingSink::new());
        let f = countdown(Arc::clone(&sink), 5);

        // call(7) nests 8 frames deep.
        assert_eq!(f.call(7), 7);
        assert_eq!(sink.hint_depths(), vec![6, 7, 8]);
        assert_eq!(f.current_depth(), 0);
    }

    #[test]
    fn disabled_hint_stays_silent() {
        let sink = Arc::new(RecordingSink::new());
        let f = recursive(
            "countdown",
            |this, n: u32| -> u32 { if n == 0 { 0 } else { 1 + this.call(n - 1) } },
            {
                let sink = Arc::clone(&sink);
                move |body| Hint::with_sink(body, sink).recursion(false)
            },
        );
        f.call(20);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn depth_unwinds_after_panic() {
        let sink = RecordingSink::new();
        let hint = Hint::with_sink(
            Function::new("boom", |_: ()| -> () { panic!("boom") }),
            &sink,
        );

        let result = catch_unwind(AssertUnwindSafe(|| hint.call(())));
        assert!(result.is_err());
        assert_eq!(hint.current_depth(), 0);
    }

    #[test]
    fn instances_count_independently() {
        let sink = RecordingSink::new();
        let a = Hint::with_sink(Function::new("a", |x: u8| x), &sink);
        let b = Hint::with_sink(Function::new("b", |x: u8| x), &sink);
        let nested = Hint::with_sink(
            Function::new("outer", |x: u8| b.call(x) + a.current_depth() as u8),
            &sink,
        )
        .max_recursion(0);

        // a is idle while b runs inside the outer call.
        assert_eq!(nested.call(1), 1);
        assert_eq!(sink.hint_depths(), vec![1]);
        assert_eq!(b.current_depth(), 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn depth_is_not_shared_between_threads() {
        let sink = Arc::new(RecordingSink::new());
        let f = countdown(Arc::clone(&sink), 3);

        // Three frames per thread stays at the limit on every thread.
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let f = Arc::clone(&f);
                std::thread::spawn(move || (f.call(2), f.current_depth()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), (2, 0));
        }
        assert!(sink.hint_depths().is_empty());
    }

    #[test]
    fn defaults() {
        let hint = Hint::new(Function::new("id", |x: u8| x));
        assert!(hint.recursion_enabled());
        assert_eq!(hint.max_recursion_limit(), 5);
    }
}
