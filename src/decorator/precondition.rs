//! Argument guards.
//!
//! [`Precondition`] evaluates a predicate on the arguments before the
//! wrapped callable runs and short-circuits with a [`PreconditionError`]
//! when it fails. [`NotNull`] is the special case that rejects `None`.
//!
//! Both wrap callables returning `Result<T, E>` where `E` can be built
//! from a [`PreconditionError`], so a guarded function reports rejections
//! through its own error type.
//!
//! ```
//! use memokit::decorator::precondition::Precondition;
//! use memokit::error::PreconditionError;
//! use memokit::function::Function;
//! use memokit::traits::Callable;
//!
//! let sqrt = Precondition::new(
//!     Function::new("sqrt", |x: f64| Ok::<_, PreconditionError>(x.sqrt())),
//!     |x: &f64| *x >= 0.0,
//! );
//!
//! assert_eq!(sqrt.call(9.0), Ok(3.0));
//! assert_eq!(sqrt.call(-1.0).unwrap_err().message(), "Precondition failed");
//! ```

use std::borrow::Cow;
use std::fmt;

use tracing::debug;

use crate::error::{DEFAULT_PRECONDITION_MESSAGE, NULL_REFERENCE_MESSAGE, PreconditionError};
use crate::traits::Callable;

/// Rejects arguments for which `predicate` returns `false`.
#[derive(Clone)]
pub struct Precondition<C, P> {
    inner: C,
    predicate: P,
    message: Cow<'static, str>,
}

impl<C, P> Precondition<C, P> {
    pub fn new(inner: C, predicate: P) -> Self {
        Self::with_message(inner, predicate, DEFAULT_PRECONDITION_MESSAGE)
    }

    /// Like [`new`](Self::new), reporting `message` on rejection.
    pub fn with_message(inner: C, predicate: P, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner,
            predicate,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C, P> fmt::Debug for Precondition<C, P>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Precondition")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish()
    }
}

impl<A, T, E, C, P> Callable<A> for Precondition<C, P>
where
    C: Callable<A, Output = Result<T, E>>,
    E: From<PreconditionError>,
    P: Fn(&A) -> bool,
{
    type Output = Result<T, E>;

    fn call(&self, args: A) -> Result<T, E> {
        if !(self.predicate)(&args) {
            debug!(function = self.inner.name(), message = %self.message, "precondition rejected arguments");
            return Err(PreconditionError::new(self.message.as_ref()).into());
        }
        self.inner.call(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Rejects `None`, forwarding the unwrapped `Some` value.
#[derive(Debug, Clone)]
pub struct NotNull<C> {
    inner: C,
}

impl<C> NotNull<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<A, T, E, C> Callable<Option<A>> for NotNull<C>
where
    C: Callable<A, Output = Result<T, E>>,
    E: From<PreconditionError>,
{
    type Output = Result<T, E>;

    fn call(&self, args: Option<A>) -> Result<T, E> {
        match args {
            Some(args) => self.inner.call(args),
            None => {
                debug!(function = self.inner.name(), "null argument rejected");
                Err(PreconditionError::new(NULL_REFERENCE_MESSAGE).into())
            },
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    enum AppError {
        Rejected(String),
    }

    impl From<PreconditionError> for AppError {
        fn from(err: PreconditionError) -> Self {
            AppError::Rejected(err.message().to_string())
        }
    }

    #[test]
    fn passing_predicate_forwards_call() {
        let double = Precondition::new(
            Function::new("double", |x: i32| Ok::<_, PreconditionError>(x * 2)),
            |x: &i32| *x > 0,
        );
        assert_eq!(double.call(4), Ok(8));
        assert_eq!(double.name(), "double");
    }

    #[test]
    fn failing_predicate_skips_inner() {
        let calls = AtomicUsize::new(0);
        let guarded = Precondition::new(
            Function::new("f", |x: i32| {
                calls.fetch_add(1, Ordering::Relaxed);
                Ok::<_, PreconditionError>(x)
            }),
            |x: &i32| *x >= 0,
        );

        let err = guarded.call(-1).unwrap_err();
        assert_eq!(err, PreconditionError::new("Precondition failed"));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn custom_message_converts_into_caller_error() {
        let guarded = Precondition::with_message(
            Function::new("f", |x: u8| Ok::<_, AppError>(x)),
            |x: &u8| *x < 10,
            "x must be below 10",
        );
        assert_eq!(
            guarded.call(12),
            Err(AppError::Rejected("x must be below 10".to_string()))
        );
        assert_eq!(guarded.message(), "x must be below 10");
    }

    #[test]
    fn not_null_rejects_none() {
        let calls = AtomicUsize::new(0);
        let guarded = NotNull::new(Function::new("len", |s: String| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok::<_, PreconditionError>(s.len())
        }));

        assert_eq!(guarded.call(Some("abc".to_string())), Ok(3));
        let err = guarded.call(None).unwrap_err();
        assert_eq!(err.message(), "Null reference exception");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
