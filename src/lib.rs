//! memokit: composable function decorators around a bounded memoization cache.
//!
//! A wrapped function is any [`Callable`](traits::Callable). Decorators own
//! what they wrap and are callables themselves, so they stack:
//!
//! ```
//! use memokit::prelude::*;
//!
//! let fib = recursive(
//!     "fibonacci",
//!     |fib, x: u64| -> Result<u64, PreconditionError> {
//!         if x < 2 { Ok(1) } else { Ok(fib.call(x - 1)? + fib.call(x - 2)?) }
//!     },
//!     |body| {
//!         Logged::new(Precondition::new(
//!             Hint::new(TryMemoize::new(body)),
//!             |x: &u64| *x <= 92,
//!         ))
//!     },
//! );
//!
//! assert_eq!(fib.call(50), Ok(20_365_011_074));
//! assert!(fib.call(100).is_err());
//! ```
//!
//! The memo table ([`cache::BoundedCache`]) is size-bounded. When an
//! insertion exceeds capacity it removes every entry sharing the lowest
//! rank under the configured [`EvictionPolicy`](policy::EvictionPolicy).

pub mod builder;
pub mod cache;
pub mod decorator;
pub mod error;
pub mod function;
pub mod key;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod sink;
pub mod traits;
