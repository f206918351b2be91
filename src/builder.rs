//! Configuration and builder for memoizing decorators.
//!
//! ## CacheConfig
//!
//! | Field      | Type             | Default         | Description           |
//! |------------|------------------|-----------------|-----------------------|
//! | `capacity` | `usize`          | 5               | Maximum entries       |
//! | `policy`   | `EvictionPolicy` | `LeastAccessed` | Eviction rank         |
//!
//! ## Example
//!
//! ```rust
//! use memokit::builder::MemoizeBuilder;
//! use memokit::function::Function;
//! use memokit::policy::EvictionPolicy;
//! use memokit::traits::Callable;
//!
//! let square = MemoizeBuilder::new()
//!     .capacity(2)
//!     .policy(EvictionPolicy::LeastInserted)
//!     .try_build(Function::new("square", |x: u64| x * x))
//!     .unwrap();
//!
//! assert_eq!(square.call(3), 9);
//! assert_eq!(square.cache_len(), 1);
//! ```

use std::str::FromStr;

use crate::cache::DEFAULT_CAPACITY;
use crate::decorator::memoize::{Fallible, Memoize, TryMemoize};
use crate::error::ConfigError;
use crate::key::CacheKey;
use crate::policy::EvictionPolicy;
use crate::traits::Callable;

/// Settings for one memo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: usize,
    pub policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: EvictionPolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self { capacity, policy }
    }

    /// Parses the policy from its configuration name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown policy name or zero capacity.
    pub fn from_parts(capacity: usize, policy: &str) -> Result<Self, ConfigError> {
        let config = Self {
            capacity,
            policy: EvictionPolicy::from_str(policy)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        Ok(())
    }
}

/// Builder for [`Memoize`] and [`TryMemoize`].
#[derive(Debug, Clone, Default)]
pub struct MemoizeBuilder {
    config: CacheConfig,
}

impl MemoizeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Removes the size bound; nothing is ever evicted.
    pub fn unbounded(mut self) -> Self {
        self.config.capacity = usize::MAX;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Wraps `inner` in a memoizer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn try_build<C, A>(self, inner: C) -> Result<Memoize<C, A>, ConfigError>
    where
        A: CacheKey,
        C: Callable<A>,
    {
        self.config.validate()?;
        Memoize::with_config(inner, self.config)
    }

    /// Wraps `inner` in a memoizer.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build`](Self::try_build).
    pub fn build<C, A>(self, inner: C) -> Memoize<C, A>
    where
        A: CacheKey,
        C: Callable<A>,
    {
        match self.try_build(inner) {
            Ok(memo) => memo,
            Err(e) => panic!("{}", e),
        }
    }

    /// Wraps a fallible `inner` in a memoizer that only stores `Ok` values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn try_build_fallible<C, A>(self, inner: C) -> Result<TryMemoize<C, A>, ConfigError>
    where
        A: CacheKey,
        C: Callable<A>,
        C::Output: Fallible,
    {
        self.config.validate()?;
        TryMemoize::with_config(inner, self.config)
    }

    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build_fallible`](Self::try_build_fallible).
    pub fn build_fallible<C, A>(self, inner: C) -> TryMemoize<C, A>
    where
        A: CacheKey,
        C: Callable<A>,
        C::Output: Fallible,
    {
        match self.try_build_fallible(inner) {
            Ok(memo) => memo,
            Err(e) => panic!("{}", e),
        }
    }
}
