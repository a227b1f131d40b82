//! Prometheus metrics describing the emitter itself
//!
//! All metrics use the `synthmetrics_` prefix and are read-only.

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

/// Self-observability counters for the emit loop
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Cycles started
    pub cycles_total: IntCounter,
    /// Points accepted by the sink
    pub points_written_total: IntCounter,
    /// Batches the sink failed to accept
    pub write_failures_total: IntCounter,
    /// Wall time of each write call in seconds
    pub write_latency_seconds: Histogram,
}

/// Point-in-time copy of the counters, logged as JSON at shutdown
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsSummary {
    pub cycles: u64,
    pub points_written: u64,
    pub write_failures: u64,
    pub writes_observed: u64,
    pub mean_write_latency_ms: f64,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles_total = IntCounter::with_opts(Opts::new(
            "synthmetrics_cycles_total",
            "Emit cycles started",
        ))?;
        registry.register(Box::new(cycles_total.clone()))?;

        let points_written_total = IntCounter::with_opts(Opts::new(
            "synthmetrics_points_written_total",
            "Points accepted by the sink",
        ))?;
        registry.register(Box::new(points_written_total.clone()))?;

        let write_failures_total = IntCounter::with_opts(Opts::new(
            "synthmetrics_write_failures_total",
            "Batch writes that failed",
        ))?;
        registry.register(Box::new(write_failures_total.clone()))?;

        let write_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "synthmetrics_write_latency_seconds",
                "Duration of batch write calls",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(write_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            cycles_total,
            points_written_total,
            write_failures_total,
            write_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn summary(&self) -> MetricsSummary {
        let writes_observed = self.write_latency_seconds.get_sample_count();
        let mean_write_latency_ms = if writes_observed > 0 {
            self.write_latency_seconds.get_sample_sum() / writes_observed as f64 * 1_000.0
        } else {
            0.0
        };

        MetricsSummary {
            cycles: self.cycles_total.get(),
            points_written: self.points_written_total.get(),
            write_failures: self.write_failures_total.get(),
            writes_observed,
            mean_write_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        assert!(metrics.render().contains("synthmetrics_"));
    }

    #[test]
    fn test_counters_render() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.cycles_total.inc();
        metrics.points_written_total.inc_by(3);
        let output = metrics.render();
        assert!(output.contains("synthmetrics_cycles_total 1"));
        assert!(output.contains("synthmetrics_points_written_total 3"));
    }

    #[test]
    fn test_summary() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        assert_eq!(metrics.summary().mean_write_latency_ms, 0.0);

        metrics.cycles_total.inc_by(2);
        metrics.write_failures_total.inc();
        metrics.write_latency_seconds.observe(0.010);
        metrics.write_latency_seconds.observe(0.030);

        let summary = metrics.summary();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.write_failures, 1);
        assert_eq!(summary.writes_observed, 2);
        assert!((summary.mean_write_latency_ms - 20.0).abs() < 1e-6);

        let json = serde_json::to_string(&summary).expect("Failed to serialize");
        assert!(json.contains("\"write_failures\":1"));
    }
}
