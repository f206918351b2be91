//! Function decorators.
//!
//! Every decorator owns the callable it wraps and implements
//! [`Callable`](crate::traits::Callable) itself, so decorators compose by
//! nesting:
//!
//! ```text
//!   Logged ─► Precondition ─► Hint ─► Memoize ─► Function / Recursive
//! ```
//!
//! | Decorator                         | Effect                                         |
//! |-----------------------------------|------------------------------------------------|
//! | [`Memoize`](memoize::Memoize)     | bounded result cache                           |
//! | [`TryMemoize`](memoize::TryMemoize) | bounded cache of `Ok` results                |
//! | [`Precondition`](precondition::Precondition) | rejects arguments failing a predicate |
//! | [`NotNull`](precondition::NotNull) | rejects `None`                                |
//! | [`Retry`](retry::Retry)           | re-invokes on `Err` while its policy allows    |
//! | [`Logged`](logging::Logged)       | reports each call to an event sink             |
//! | [`Hint`](hint::Hint)              | reports excessive per-thread recursion depth   |

pub mod hint;
pub mod logging;
pub mod memoize;
pub mod precondition;
pub mod retry;
