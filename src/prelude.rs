pub use crate::builder::{CacheConfig, MemoizeBuilder};
pub use crate::cache::{BoundedCache, CacheEntry};
pub use crate::decorator::hint::Hint;
pub use crate::decorator::logging::Logged;
pub use crate::decorator::memoize::{Fallible, Memoize, TryMemoize};
pub use crate::decorator::precondition::{NotNull, Precondition};
pub use crate::decorator::retry::{Retry, RetryNTimes, RetryPolicy};
pub use crate::error::{ConfigError, PreconditionError};
pub use crate::function::{Function, recursive};
pub use crate::key::{CacheKey, Uncacheable};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::MemoMetricsSnapshot;
pub use crate::policy::EvictionPolicy;
pub use crate::sink::{EventSink, RecordingSink, TracingSink};
pub use crate::traits::Callable;
