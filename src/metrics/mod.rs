//! Counters for memoized callables (feature `metrics`).
//!
//! Recording, snapshotting and export are separate concerns:
//!
//! ```text
//!   BoundedCache / Memoize ──record──► MemoMetrics
//!                                          │ snapshot
//!                                          ▼
//!                                  MemoMetricsSnapshot ──export──► PrometheusTextExporter
//! ```

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
