//! Call logging.
//!
//! [`Logged`] reports the callable's name and arguments to an
//! [`EventSink`] before forwarding the call unchanged. With the default
//! [`TracingSink`] each call becomes an `INFO` event reading
//! `[LOG] name(args)`.

use std::fmt;

use crate::sink::{EventSink, TracingSink};
use crate::traits::Callable;

/// Reports every call to its sink, then forwards it.
#[derive(Clone)]
pub struct Logged<C, S = TracingSink> {
    inner: C,
    sink: S,
}

impl<C> Logged<C> {
    pub fn new(inner: C) -> Self {
        Self::with_sink(inner, TracingSink)
    }
}

impl<C, S> Logged<C, S> {
    pub fn with_sink(inner: C, sink: S) -> Self {
        Self { inner, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: fmt::Debug, S> fmt::Debug for Logged<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logged").field("inner", &self.inner).finish()
    }
}

impl<A, C, S> Callable<A> for Logged<C, S>
where
    A: fmt::Debug,
    C: Callable<A>,
    S: EventSink,
{
    type Output = C::Output;

    fn call(&self, args: A) -> C::Output {
        self.sink.on_call(self.inner.name(), &args);
        self.inner.call(args)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
