use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use synthmetrics::application::{Emitter, MetricGenerator, StartupError, start};
use synthmetrics::config::{Config, ConfigError};
use synthmetrics::infrastructure::InMemorySink;
use synthmetrics::infrastructure::observability::Metrics;

fn config_with_interval(interval_ms: u64) -> Config {
    let interval = interval_ms.to_string();
    Config::from_lookup(move |key| match key {
        "INFLUXDB_TOKEN" => Some("integration-token".to_string()),
        "EMIT_INTERVAL_MS" => Some(interval.clone()),
        _ => None,
    })
    .unwrap()
}

fn emitter_for(config: &Config, sink: &InMemorySink) -> Emitter {
    Emitter::with_generator(
        config,
        Arc::new(sink.clone()),
        Metrics::new().expect("Failed to create metrics"),
        MetricGenerator::seeded(2024),
    )
}

#[test]
fn test_missing_token_stops_before_any_write() {
    let factory_calls = AtomicUsize::new(0);
    let sink = InMemorySink::new();

    let result = start(
        |key| match key {
            "INFLUXDB_URL" => Some("http://localhost:8086".to_string()),
            _ => None,
        },
        |_| {
            factory_calls.fetch_add(1, Ordering::SeqCst);
            Ok(sink.clone())
        },
    );

    assert!(matches!(
        result,
        Err(StartupError::Config(ConfigError::MissingToken))
    ));
    assert_eq!(factory_calls.load(Ordering::SeqCst), 0);
    assert_eq!(sink.attempts(), 0);
    assert_eq!(sink.close_calls(), 0);
}

#[tokio::test]
async fn test_started_emitter_writes_to_factory_sink() {
    let sink = InMemorySink::new();
    let factory_sink = sink.clone();

    let startup = start(
        |key| match key {
            "INFLUXDB_TOKEN" => Some("integration-token".to_string()),
            "EMIT_INTERVAL_MS" => Some("5".to_string()),
            _ => None,
        },
        move |_| Ok(factory_sink),
    )
    .unwrap();

    let watcher = sink.clone();
    let summary = startup
        .emitter
        .run(async move {
            while watcher.attempts() < 2 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;

    assert!(summary.cycles >= 2);
    assert_eq!(sink.batches().await.len(), sink.attempts());
    assert_eq!(sink.close_calls(), 1);
}

#[tokio::test]
async fn test_write_failure_does_not_stop_loop() {
    let sink = InMemorySink::new();
    sink.fail_next(1);
    let emitter = emitter_for(&config_with_interval(10), &sink);

    let watcher = sink.clone();
    let summary = emitter
        .run(async move {
            while watcher.attempts() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;

    assert!(sink.attempts() >= 3);
    assert_eq!(summary.write_failures, 1);
    assert_eq!(sink.batches().await.len(), sink.attempts() - 1);
    assert_eq!(sink.close_calls(), 1);
}

#[tokio::test]
async fn test_interrupt_during_sleep_exits_within_one_cycle() {
    let sink = InMemorySink::new();
    let emitter = emitter_for(&config_with_interval(2_000), &sink);

    let started = Instant::now();
    let summary = emitter
        .run(tokio::time::sleep(Duration::from_millis(50)))
        .await;

    assert!(started.elapsed() < Duration::from_millis(2_000));
    assert_eq!(summary.cycles, 1);
    assert_eq!(sink.attempts(), 1);
    assert_eq!(sink.close_calls(), 1);
}

#[tokio::test]
async fn test_every_batch_shares_one_timestamp() {
    let sink = InMemorySink::new();
    let emitter = emitter_for(&config_with_interval(5), &sink);

    let watcher = sink.clone();
    emitter
        .run(async move {
            while watcher.attempts() < 4 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;

    let batches = sink.batches().await;
    assert!(batches.len() >= 4);
    for batch in &batches {
        let measurements: Vec<&str> = batch.points.iter().map(|p| p.measurement()).collect();
        assert_eq!(measurements, ["system_stats", "network_stats", "business_stats"]);

        let first = batch.points[0].timestamp_ns();
        assert!(first.is_some());
        assert!(batch.points.iter().all(|p| p.timestamp_ns() == first));
    }
    assert_eq!(batches[0].target.bucket, "my-bucket");
    assert_eq!(batches[0].target.org, "my-org");
}

#[tokio::test]
async fn test_shutdown_before_first_cycle_writes_nothing() {
    let sink = InMemorySink::new();
    let emitter = emitter_for(&config_with_interval(10), &sink);

    let summary = emitter.run(std::future::ready(())).await;

    assert_eq!(summary.cycles, 0);
    assert_eq!(sink.attempts(), 0);
    assert_eq!(sink.close_calls(), 1);
}

#[tokio::test]
async fn test_failed_release_still_returns_summary() {
    let sink = InMemorySink::new();
    sink.fail_close();
    let emitter = emitter_for(&config_with_interval(2_000), &sink);

    let summary = emitter
        .run(tokio::time::sleep(Duration::from_millis(20)))
        .await;

    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.points_written, 3);
    assert_eq!(summary.write_failures, 0);
    assert_eq!(sink.close_calls(), 1);
}
