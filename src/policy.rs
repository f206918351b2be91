//! Eviction policies for [`BoundedCache`](crate::cache::BoundedCache).
//!
//! Each policy names the entry field used to rank entries when the cache
//! grows past capacity. The eviction pass removes every entry that shares
//! the minimum rank.
//!
//! | Policy          | Rank field        | Ties possible            |
//! |-----------------|-------------------|--------------------------|
//! | `LeastInserted` | `insertion_order` | No                       |
//! | `LeastAccessed` | `access_order`    | No (counter is per call) |
//! | `LeastHit`      | `hit_count`       | Yes, common              |
//!
//! Policies parse from the upper-case names used in configuration files
//! (`LEAST_INSERTED`, `LEAST_ACCESSED`, `LEAST_HIT`) as well as their
//! lower-case and kebab-case spellings:
//!
//! ```
//! use memokit::policy::EvictionPolicy;
//!
//! assert_eq!("LEAST_HIT".parse(), Ok(EvictionPolicy::LeastHit));
//! assert_eq!("least-inserted".parse(), Ok(EvictionPolicy::LeastInserted));
//! assert!("LEAST_RECENT".parse::<EvictionPolicy>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Rule selecting which entries leave the cache when capacity is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvictionPolicy {
    /// Evict the entry inserted first.
    LeastInserted,
    /// Evict the entry whose last access is oldest.
    #[default]
    LeastAccessed,
    /// Evict the entries with the fewest hits.
    LeastHit,
}

impl EvictionPolicy {
    /// All recognised policies.
    pub const ALL: [EvictionPolicy; 3] = [
        EvictionPolicy::LeastInserted,
        EvictionPolicy::LeastAccessed,
        EvictionPolicy::LeastHit,
    ];

    /// Canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::LeastInserted => "LEAST_INSERTED",
            EvictionPolicy::LeastAccessed => "LEAST_ACCESSED",
            EvictionPolicy::LeastHit => "LEAST_HIT",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        EvictionPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "unknown eviction policy {:?}: expected one of LEAST_INSERTED, LEAST_ACCESSED, LEAST_HIT",
                    s
                ))
            })
    }
}
