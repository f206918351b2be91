//! Destinations for decorator side-channel events.
//!
//! [`Logged`](crate::decorator::logging::Logged) reports each call and
//! [`Hint`](crate::decorator::hint::Hint) reports excessive recursion to an
//! [`EventSink`]. The default, [`TracingSink`], turns both into `tracing`
//! events; the library never installs a subscriber itself.
//!
//! | Event            | Level  | Target           | Message                                   |
//! |------------------|--------|------------------|-------------------------------------------|
//! | call             | `INFO` | `memokit::call`  | `[LOG] name(args)`                        |
//! | recursion hint   | `WARN` | `memokit::hint`  | `[HINT] Too many recursion for name, ...` |

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

/// Receiver of decorator events. Must never fail or block for long.
pub trait EventSink {
    /// A call to `name` with `args` is about to run.
    fn on_call(&self, name: &str, args: &dyn fmt::Debug);

    /// `name` is `depth` frames deep on the current thread, above `max`.
    fn on_recursion_hint(&self, name: &str, depth: usize, max: usize);
}

/// Formats a call the way [`TracingSink`] logs it.
pub fn format_call(name: &str, args: &dyn fmt::Debug) -> String {
    format!("[LOG] {}({:?})", name, args)
}

/// Formats a recursion hint the way [`TracingSink`] logs it.
pub fn format_recursion_hint(name: &str, depth: usize, max: usize) -> String {
    format!(
        "[HINT] Too many recursion for {}, {} recursion levels of {} allowed.",
        name, depth, max
    )
}

/// Emits events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_call(&self, name: &str, args: &dyn fmt::Debug) {
        info!(target: "memokit::call", function = name, "{}", format_call(name, args));
    }

    fn on_recursion_hint(&self, name: &str, depth: usize, max: usize) {
        warn!(
            target: "memokit::hint",
            function = name,
            depth,
            max,
            "{}",
            format_recursion_hint(name, depth, max)
        );
    }
}

/// An event captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Call { name: String, args: String },
    RecursionHint { name: String, depth: usize, max: usize },
}

/// Keeps every event in memory, in arrival order.
///
/// Handy for asserting on decorator side effects in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Rendered `[LOG] ...` lines for every recorded call.
    pub fn call_lines(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Call { name, args } => Some(format!("[LOG] {}({})", name, args)),
                SinkEvent::RecursionHint { .. } => None,
            })
            .collect()
    }

    /// Depths at which recursion hints fired.
    pub fn hint_depths(&self) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::RecursionHint { depth, .. } => Some(*depth),
                SinkEvent::Call { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn on_call(&self, name: &str, args: &dyn fmt::Debug) {
        self.events.lock().push(SinkEvent::Call {
            name: name.to_string(),
            args: format!("{:?}", args),
        });
    }

    fn on_recursion_hint(&self, name: &str, depth: usize, max: usize) {
        self.events.lock().push(SinkEvent::RecursionHint {
            name: name.to_string(),
            depth,
            max,
        });
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn on_call(&self, name: &str, args: &dyn fmt::Debug) {
        (**self).on_call(name, args)
    }

    fn on_recursion_hint(&self, name: &str, depth: usize, max: usize) {
        (**self).on_recursion_hint(name, depth, max)
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn on_call(&self, name: &str, args: &dyn fmt::Debug) {
        (**self).on_call(name, args)
    }

    fn on_recursion_hint(&self, name: &str, depth: usize, max: usize) {
        (**self).on_recursion_hint(name, depth, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_format_shows_name_and_args() {
        assert_eq!(format_call("fibonacci", &7u64), "[LOG] fibonacci(7)");
        assert_eq!(format_call("add", &(1, 2)), "[LOG] add((1, 2))");
    }

    #[test]
    fn hint_format_matches_documented_text() {
        assert_eq!(
            format_recursion_hint("fibonacci", 6, 5),
            "[HINT] Too many recursion for fibonacci, 6 recursion levels of 5 allowed."
        );
    }

    #[test]
    fn recording_sink_keeps_arrival_order() {
        let sink = RecordingSink::new();
        sink.on_call("f", &1u8);
        sink.on_recursion_hint("f", 7, 5);
        sink.on_call("f", &2u8);

        assert_eq!(sink.call_lines(), vec!["[LOG] f(1)", "[LOG] f(2)"]);
        assert_eq!(sink.hint_depths(), vec![7]);
        assert_eq!(sink.events().len(), 3);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn tracing_sink_is_silent_without_subscriber() {
        TracingSink.on_call("noop", &());
        TracingSink.on_recursion_hint("noop", 10, 1);
    }
}
