//! Re-invocation on failure.
//!
//! [`Retry`] calls the wrapped callable, and on `Err` asks its
//! [`RetryPolicy`] whether to try again. The attempt index passed to the
//! policy starts at 0 for the first failure and grows by one per retry, so
//! every policy sees a strictly increasing sequence and the loop is bounded
//! by the policy alone.
//!
//! ```text
//!   attempt = 0
//!   loop {
//!       match inner.call(args.clone()) {
//!           Ok(v)  => return Ok(v),
//!           Err(e) => if !policy.should_retry(&e, attempt) { return Err(e) }
//!       }
//!       attempt += 1
//!   }
//! ```

use std::fmt;

use tracing::debug;

use crate::traits::Callable;

/// Number of retries [`RetryNTimes::default`] allows.
pub const DEFAULT_RETRIES: u32 = 2;

/// Decides whether a failed call is tried again.
pub trait RetryPolicy<E> {
    /// `attempt` is 0 for the first failure.
    fn should_retry(&self, error: &E, attempt: u32) -> bool;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> bool,
{
    #[inline]
    fn should_retry(&self, error: &E, attempt: u32) -> bool {
        self(error, attempt)
    }
}

/// Retries any error up to `n` times, for at most `n + 1` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNTimes(pub u32);

impl Default for RetryNTimes {
    fn default() -> Self {
        Self(DEFAULT_RETRIES)
    }
}

impl<E> RetryPolicy<E> for RetryNTimes {
    #[inline]
    fn should_retry(&self, _error: &E, attempt: u32) -> bool {
        attempt < self.0
    }
}

/// Retries the wrapped callable while its policy allows.
#[derive(Clone)]
pub struct Retry<C, P> {
    inner: C,
    policy: P,
}

impl<C, P> Retry<C, P> {
    pub fn new(inner: C, policy: P) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C> Retry<C, RetryNTimes> {
    /// Retries up to `n` times.
    pub fn times(inner: C, n: u32) -> Self {
        Self::new(inner, RetryNTimes(n))
    }
}

impl<C, P> fmt::Debug for Retry<C, P>
where
    C: fmt::Debug,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("inner", &self.inner)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<A, T, E, C, P> Callable<A> for Retry<C, P>
where
    A: Clone,
    C: Callable<A, Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    type Output = Result<T, E>;

    fn call(&self, args: A) -> Result<T, E> {
        let mut attempt: u32 = 0;
        loop {
            let error = match self.inner.call(args.clone()) {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if !self.policy.should_retry(&error, attempt) {
                debug!(function = self.inner.name(), attempt, ?error, "giving up");
                return Err(error);
            }
            debug!(function = self.inner.name(), attempt, ?error, "retrying");
            attempt = attempt.saturating_add(1);
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn flaky(failures: u32, calls: &AtomicU32) -> Function<impl Fn(u32) -> Result<u32, String> + '_> {
        Function::new("flaky", move |x: u32| {
            let n = calls.fetch_add(1, Ordering::Relaxed);
            if n < failures {
                Err(format!("failure {}", n))
            } else {
                Ok(x)
            }
        })
    }

    #[test]
    fn success_needs_no_retry() {
        let calls = AtomicU32::new(0);
        let retry = Retry::new(flaky(0, &calls), RetryNTimes::default());
        assert_eq!(retry.call(7), Ok(7));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let retry = Retry::times(flaky(2, &calls), 2);
        assert_eq!(retry.call(7), Ok(7));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn returns_last_error_when_policy_declines() {
        let calls = AtomicU32::new(0);
        let retry = Retry::times(flaky(10, &calls), 2);
        assert_eq!(retry.call(7), Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn closure_policy_sees_increasing_attempts() {
        let calls = AtomicU32::new(0);
        let seen = parking_lot::Mutex::new(Vec::new());
        let retry = Retry::new(flaky(10, &calls), |_: &String, attempt: u32| {
            seen.lock().push(attempt);
            attempt < 3
        });

        assert!(retry.call(1).is_err());
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3]);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn zero_retries_calls_once() {
        let calls = AtomicU32::new(0);
        let retry = Retry::times(flaky(10, &calls), 0);
        assert!(retry.call(1).is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn default_policy_is_two_retries() {
        assert_eq!(RetryNTimes::default(), RetryNTimes(2));
    }
}
