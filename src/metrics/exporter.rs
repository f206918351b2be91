use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for memo table snapshots.
///
/// Writes the Prometheus text exposition format so it can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector. Write errors are
/// ignored: metrics never affect the memoized function.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<MemoMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &MemoMetricsSnapshot) {
        let counters = [
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("bypasses_total", snapshot.bypasses),
            ("insert_calls_total", snapshot.insert_calls),
            ("insert_new_total", snapshot.insert_new),
            ("insert_rejected_total", snapshot.insert_rejected),
            ("evict_calls_total", snapshot.evict_calls),
            ("evicted_entries_total", snapshot.evicted_entries),
            ("uncached_failures_total", snapshot.uncached_failures),
            ("clears_total", snapshot.clears),
        ];
        for (suffix, value) in counters {
            self.write_metric("counter", suffix, value);
        }
        self.write_metric("gauge", "cache_len", snapshot.cache_len as u64);
        self.write_metric("gauge", "capacity", snapshot.capacity as u64);
    }
}
