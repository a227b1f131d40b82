//! Ctrl+C delivered while the first write is in flight.
#![cfg(unix)]

use async_trait::async_trait;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use synthmetrics::application::{Emitter, Interrupt, MetricGenerator};
use synthmetrics::config::Config;
use synthmetrics::domain::errors::SinkError;
use synthmetrics::domain::point::Point;
use synthmetrics::domain::ports::{MetricSink, WriteTarget};
use synthmetrics::infrastructure::InMemorySink;
use synthmetrics::infrastructure::observability::Metrics;

/// Sends SIGINT to this process from inside the first write, then lingers so the
/// signal lands before the write returns.
struct InterruptingSink {
    inner: InMemorySink,
}

#[async_trait]
impl MetricSink for InterruptingSink {
    async fn write(&self, target: &WriteTarget, points: &[Point]) -> Result<(), SinkError> {
        if self.inner.attempts() == 0 {
            let status = Command::new("kill")
                .arg("-INT")
                .arg(std::process::id().to_string())
                .status()
                .expect("failed to run kill");
            assert!(status.success());
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        self.inner.write(target, points).await
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_interrupt_during_first_write_releases_sink() {
    let mut interrupt = Interrupt::install().unwrap();

    let config = Config::from_lookup(|key| match key {
        "INFLUXDB_TOKEN" => Some("integration-token".to_string()),
        "EMIT_INTERVAL_MS" => Some("10".to_string()),
        _ => None,
    })
    .unwrap();
    let recorder = InMemorySink::new();
    let emitter = Emitter::with_generator(
        &config,
        Arc::new(InterruptingSink {
            inner: recorder.clone(),
        }),
        Metrics::new().unwrap(),
        MetricGenerator::seeded(7),
    );

    let summary = tokio::time::timeout(Duration::from_secs(5), emitter.run(interrupt.recv()))
        .await
        .expect("emitter did not stop after the interrupt");

    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.points_written, 3);
    assert_eq!(recorder.batches().await.len(), 1);
    assert_eq!(recorder.close_calls(), 1);
}
