//! # Callable Trait
//!
//! Every decorator in this crate wraps a value implementing [`Callable`] and
//! is itself a [`Callable`] with the same argument type, so decorators
//! compose by nesting:
//!
//! ```text
//!   Logged ──► Precondition ──► Hint ──► Memoize ──► Function
//!     │             │             │          │           │
//!   report      reject bad     count      lookup or    user
//!   (name,args)  arguments     depth      compute      closure
//! ```
//!
//! Each layer forwards the argument and the return value unchanged, except
//! for its own side effect (logging, depth counting) or short-circuit
//! (precondition failure, cache hit).
//!
//! ## Trait Summary
//!
//! | Item                    | Purpose                                          |
//! |-------------------------|--------------------------------------------------|
//! | `Callable<A>`           | Single-argument call with a reportable name      |
//! | `DynCallable<A, R>`     | Thread-safe trait object used for recursion     |
//!
//! Multi-argument functions take a tuple as their single argument; the
//! tuple is the cache key.
//!
//! ## Example
//!
//! ```
//! use memokit::function::Function;
//! use memokit::traits::Callable;
//!
//! let add = Function::new("add", |(a, b): (u32, u32)| a + b);
//! assert_eq!(add.call((2, 3)), 5);
//! assert_eq!(add.name(), "add");
//! ```

use std::sync::Arc;

/// Name reported by callables that were never given one.
pub const ANONYMOUS: &str = "<anonymous>";

/// A function of one argument that decorators can wrap.
pub trait Callable<A> {
    type Output;

    /// Invokes the callable.
    fn call(&self, args: A) -> Self::Output;

    /// Name used by logging and recursion hints.
    fn name(&self) -> &str {
        ANONYMOUS
    }
}

/// Type-erased, thread-safe callable.
///
/// Recursive bodies receive the fully decorated function through this type
/// (see [`recursive`](crate::function::recursive)).
pub type DynCallable<A, R> = dyn Callable<A, Output = R> + Send + Sync;

impl<A, C> Callable<A> for &C
where
    C: Callable<A> + ?Sized,
{
    type Output = C::Output;

    #[inline]
    fn call(&self, args: A) -> Self::Output {
        (**self).call(args)
    }

    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A, C> Callable<A> for Box<C>
where
    C: Callable<A> + ?Sized,
{
    type Output = C::Output;

    #[inline]
    fn call(&self, args: A) -> Self::Output {
        (**self).call(args)
    }

    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A, C> Callable<A> for Arc<C>
where
    C: Callable<A> + ?Sized,
{
    type Output = C::Output;

    #[inline]
    fn call(&self, args: A) -> Self::Output {
        (**self).call(args)
    }

    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Double;

    impl Callable<u32> for Double {
        type Output = u32;

        fn call(&self, args: u32) -> u32 {
            args * 2
        }
    }

    #[test]
    fn default_name_is_anonymous() {
        assert_eq!(Double.name(), ANONYMOUS);
    }

    #[test]
    fn references_and_smart_pointers_forward() {
        let by_ref = &Double;
        let boxed: Box<DynCallable<u32, u32>> = Box::new(Double);
        let shared = Arc::new(Double);

        assert_eq!(by_ref.call(2), 4);
        assert_eq!(boxed.call(3), 6);
        assert_eq!(shared.call(4), 8);
        assert_eq!(boxed.name(), ANONYMOUS);
    }
}
