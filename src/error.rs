//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a memoizer or cache is configured with
//!   invalid parameters (zero capacity, unknown eviction policy name).
//! - [`PreconditionError`]: Returned by [`Precondition`](crate::decorator::precondition::Precondition)
//!   and [`NotNull`](crate::decorator::precondition::NotNull) when an argument
//!   is rejected before the wrapped callable runs.
//! - [`InvariantError`]: Returned when internal cache invariants are
//!   violated (debug-only `check_invariants`).
//!
//! ## Example Usage
//!
//! ```
//! use memokit::error::ConfigError;
//! use memokit::policy::EvictionPolicy;
//!
//! let policy: Result<EvictionPolicy, ConfigError> = "LEAST_HIT".parse();
//! assert!(policy.is_ok());
//!
//! let bad: Result<EvictionPolicy, ConfigError> = "LEAST_RECENT".parse();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`BoundedCache::check_invariants`](crate::cache::BoundedCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by [`CacheConfig::validate`](crate::builder::CacheConfig::validate),
/// [`MemoizeBuilder::try_build`](crate::builder::MemoizeBuilder::try_build) and
/// parsing an [`EvictionPolicy`](crate::policy::EvictionPolicy) from a string.
///
/// # Example
///
/// ```
/// use memokit::cache::BoundedCache;
/// use memokit::policy::EvictionPolicy;
///
/// let err = BoundedCache::<u64, u64>::try_new(0, EvictionPolicy::LeastHit).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// PreconditionError
// ---------------------------------------------------------------------------

/// Message used by [`Precondition`](crate::decorator::precondition::Precondition)
/// when no custom message is given.
pub const DEFAULT_PRECONDITION_MESSAGE: &str = "Precondition failed";

/// Message used by [`NotNull`](crate::decorator::precondition::NotNull).
pub const NULL_REFERENCE_MESSAGE: &str = "Null reference exception";

/// An argument was rejected by a precondition guard.
///
/// The wrapped callable is never invoked when this error is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionError {
    message: String,
}

impl PreconditionError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for PreconditionError {
    fn default() -> Self {
        Self::new(DEFAULT_PRECONDITION_MESSAGE)
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid argument: {}", self.message)
    }
}

impl std::error::Error for PreconditionError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
