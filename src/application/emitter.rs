//! The emit loop: generate, write, report, sleep, until told to stop.

use crate::application::generator::MetricGenerator;
use crate::config::{Config, TagConfig};
use crate::domain::errors::SinkError;
use crate::domain::ports::{MetricSink, WriteTarget};
use crate::domain::records::Snapshot;
use crate::infrastructure::observability::{Metrics, MetricsSummary};
use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Result of one generate-and-write iteration
#[derive(Debug)]
pub enum CycleOutcome {
    Written { snapshot: Snapshot, points: usize },
    Failed { snapshot: Snapshot, error: SinkError },
}

impl CycleOutcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            CycleOutcome::Written { snapshot, .. } | CycleOutcome::Failed { snapshot, .. } => {
                snapshot
            }
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, CycleOutcome::Written { .. })
    }
}

/// Drives the generator and the sink on a fixed cadence.
///
/// Exactly one write is in flight at a time. `run` consumes the emitter and
/// closes the sink once on the way out.
pub struct Emitter<R: Rng = StdRng> {
    sink: Arc<dyn MetricSink>,
    target: WriteTarget,
    tags: TagConfig,
    interval: Duration,
    generator: MetricGenerator<R>,
    metrics: Metrics,
}

impl Emitter<StdRng> {
    pub fn new(config: &Config, sink: Arc<dyn MetricSink>, metrics: Metrics) -> Self {
        Self::with_generator(config, sink, metrics, MetricGenerator::from_entropy())
    }
}

impl<R: Rng> Emitter<R> {
    pub fn with_generator(
        config: &Config,
        sink: Arc<dyn MetricSink>,
        metrics: Metrics,
        generator: MetricGenerator<R>,
    ) -> Self {
        Self {
            sink,
            target: WriteTarget::new(config.bucket.clone(), config.org.clone()),
            tags: config.tags.clone(),
            interval: config.interval,
            generator,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Generate one snapshot and submit it as a single batch.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.metrics.cycles_total.inc();

        let snapshot = self.generator.snapshot(capture_timestamp());
        let points = snapshot.to_points(&self.tags);

        let started = Instant::now();
        let result = self.sink.write(&self.target, &points).await;
        self.metrics
            .write_latency_seconds
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                self.metrics.points_written_total.inc_by(points.len() as u64);
                CycleOutcome::Written {
                    snapshot,
                    points: points.len(),
                }
            }
            Err(error) => {
                self.metrics.write_failures_total.inc();
                CycleOutcome::Failed { snapshot, error }
            }
        }
    }

    /// Loop until `shutdown` resolves, then release the sink.
    ///
    /// `shutdown` is checked before every cycle and during the sleep, never
    /// during a write, so an in-flight write always completes first.
    pub async fn run<F>(mut self, shutdown: F) -> MetricsSummary
    where
        F: Future<Output = ()>,
    {
        info!("Generating real-time data every {:?}... Press Ctrl+C to stop.", self.interval);
        tokio::pin!(shutdown);

        let mut delay = Duration::ZERO;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Stopping emitter.");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            delay = self.interval;

            match self.run_cycle().await {
                CycleOutcome::Written { snapshot, .. } => info!("{}", snapshot.summary()),
                CycleOutcome::Failed { error, .. } => error!("Error: {}", error),
            }
        }

        self.release().await;

        let summary = self.metrics.summary();
        match serde_json::to_string(&summary) {
            Ok(json) => info!("METRICS_JSON:{}", json),
            Err(e) => warn!("Failed to serialize metrics summary: {}", e),
        }
        debug!("{}", self.metrics.render());
        summary
    }

    async fn release(&self) {
        // A failed release does not change the exit status.
        match self.sink.close().await {
            Ok(()) => info!("Sink connection released."),
            Err(e) => warn!("Failed to release sink connection: {}", e),
        }
    }
}

/// Nanoseconds since the Unix epoch, shared by every point of a cycle.
fn capture_timestamp() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
