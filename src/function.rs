//! Plain closures as named callables, and recursion through a decorator stack.
//!
//! [`Function`] attaches a name to a closure so that [`Logged`](crate::decorator::logging::Logged)
//! and [`Hint`](crate::decorator::hint::Hint) can report it.
//!
//! A memoized recursive function only benefits from the cache if its
//! recursive calls go through the cache too. [`recursive`] builds the
//! decorator stack around a body that receives the *outermost* callable:
//!
//! ```text
//!   recursive(name, body, decorate)
//!
//!   ┌──────────────────── Arc<W> ────────────────────┐
//!   │  Logged(Hint(Memoize(Recursive { body, this }))) │
//!   └───────────────────────────▲─────────────┬──────┘
//!                               │  Weak       │
//!                               └─────────────┘
//!   body(this, x) calls this.call(x - 1), re-entering at the top.
//! ```
//!
//! ## Example
//!
//! ```
//! use memokit::builder::MemoizeBuilder;
//! use memokit::function::recursive;
//! use memokit::traits::Callable;
//!
//! let fib = recursive(
//!     "fibonacci",
//!     |fib, x: u64| -> u64 { if x < 2 { 1 } else { fib.call(x - 1) + fib.call(x - 2) } },
//!     |body| MemoizeBuilder::new().capacity(8).build(body),
//! );
//!
//! assert_eq!(fib.call(50), 20_365_011_074);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::traits::{Callable, DynCallable};

/// A closure with a name.
#[derive(Clone)]
pub struct Function<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> Function<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Wraps a closure under the name [`ANONYMOUS`](crate::traits::ANONYMOUS).
    pub fn anonymous(f: F) -> Self {
        Self::new(crate::traits::ANONYMOUS, f)
    }

    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<F> fmt::Debug for Function<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

impl<A, R, F> Callable<A> for Function<F>
where
    F: Fn(A) -> R,
{
    type Output = R;

    #[inline]
    fn call(&self, args: A) -> R {
        (self.f)(args)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Innermost layer of a stack built by [`recursive`].
///
/// Holds the body and a weak handle to the outermost decorator so that the
/// body can re-enter the full stack.
pub struct Recursive<A, R, B> {
    name: Cow<'static, str>,
    body: B,
    this: Weak<DynCallable<A, R>>,
}

impl<A, R, B> fmt::Debug for Recursive<A, R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recursive")
            .field("name", &self.name)
            .field("tied", &(self.this.strong_count() > 0))
            .finish()
    }
}

impl<A, R, B> Callable<A> for Recursive<A, R, B>
where
    B: Fn(&DynCallable<A, R>, A) -> R,
{
    type Output = R;

    fn call(&self, args: A) -> R {
        // Only dead while `decorate` is still building the stack.
        let this = self
            .this
            .upgrade()
            .expect("recursive callable invoked outside its decorator stack");
        (self.body)(&*this, args)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builds a decorator stack around a recursive body.
///
/// `decorate` receives the innermost layer and returns the outermost
/// decorator. `body` receives that outermost decorator on every call, so its
/// recursive calls pass through every layer (cache, hints, logging).
///
/// # Panics
///
/// The stack is tied together only after `decorate` returns. If `decorate`
/// calls the layer it is given (directly or through a decorator it builds),
/// the body has no outer callable to re-enter yet and the call panics.
pub fn recursive<A, R, B, D, W>(name: impl Into<Cow<'static, str>>, body: B, decorate: D) -> Arc<W>
where
    A: 'static,
    R: 'static,
    B: Fn(&DynCallable<A, R>, A) -> R,
    D: FnOnce(Recursive<A, R, B>) -> W,
    W: Callable<A, Output = R> + Send + Sync + 'static,
{
    let name = name.into();
    Arc::new_cyclic(|outer: &Weak<W>| {
        let this: Weak<DynCallable<A, R>> = outer.clone();
        decorate(Recursive { name, body, this })
    })
}
