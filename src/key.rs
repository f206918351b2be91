//! Cache keys.
//!
//! A memoized callable needs to turn its argument into something it can
//! store in a hash table. [`CacheKey`] expresses that as a compile-time
//! capability: every key-like standard type maps to itself, while the
//! [`Uncacheable`] marker opts an argument out so that the call bypasses the
//! cache entirely.
//!
//! | Argument type                       | Key                       |
//! |-------------------------------------|---------------------------|
//! | integers, `bool`, `char`, `()`      | itself                    |
//! | `String`, `&str`                    | `String`                  |
//! | tuples (up to 6), `Option`, `Vec`   | element-wise              |
//! | `Uncacheable<T>`                    | none: always bypassed     |
//!
//! A composite containing an `Uncacheable` part has no key either.
//!
//! ```
//! use memokit::key::{CacheKey, Uncacheable};
//!
//! assert_eq!((1u8, "a").cache_key(), Some((1u8, "a".to_string())));
//! assert_eq!(Uncacheable(vec![1.5f64]).cache_key(), None);
//! assert_eq!((1u8, Uncacheable(0.5f64)).cache_key(), None);
//! ```

use std::convert::Infallible;
use std::hash::Hash;

/// Capability of producing a hash-table key from a call argument.
pub trait CacheKey {
    type Key: Eq + Hash + Clone;

    /// Returns `None` when the argument must not be cached.
    fn cache_key(&self) -> Option<Self::Key>;
}

/// Marks an argument as unusable as a cache key.
///
/// Calls with this argument always reach the wrapped function and leave the
/// cache untouched. Useful for arguments such as floats or mutable buffers
/// whose identity is not meaningful.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Uncacheable<T>(pub T);

impl<T> Uncacheable<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> CacheKey for Uncacheable<T> {
    type Key = Infallible;

    #[inline]
    fn cache_key(&self) -> Option<Infallible> {
        None
    }
}

macro_rules! self_keyed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CacheKey for $ty {
                type Key = $ty;

                #[inline]
                fn cache_key(&self) -> Option<$ty> {
                    Some(self.clone())
                }
            }
        )*
    };
}

self_keyed!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String,
);

impl CacheKey for &str {
    type Key = String;

    #[inline]
    fn cache_key(&self) -> Option<String> {
        Some((*self).to_owned())
    }
}

impl<T: CacheKey> CacheKey for Option<T> {
    type Key = Option<T::Key>;

    fn cache_key(&self) -> Option<Self::Key> {
        match self {
            Some(inner) => inner.cache_key().map(Some),
            None => Some(None),
        }
    }
}

impl<T: CacheKey> CacheKey for Vec<T> {
    type Key = Vec<T::Key>;

    fn cache_key(&self) -> Option<Self::Key> {
        self.iter().map(CacheKey::cache_key).collect()
    }
}

impl<T: CacheKey> CacheKey for Box<T> {
    type Key = T::Key;

    #[inline]
    fn cache_key(&self) -> Option<Self::Key> {
        (**self).cache_key()
    }
}

macro_rules! tuple_keyed {
    ($(($($name:ident),+)),* $(,)?) => {
        $(
            impl<$($name: CacheKey),+> CacheKey for ($($name,)+) {
                type Key = ($($name::Key,)+);

                #[allow(non_snake_case)]
                fn cache_key(&self) -> Option<Self::Key> {
                    let ($($name,)+) = self;
                    Some(($($name.cache_key()?,)+))
                }
            }
        )*
    };
}

tuple_keyed!(
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
    (A, B, C, D, E),
    (A, B, C, D, E, F),
);
