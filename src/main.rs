//! synthmetrics - synthetic time-series generator
//!
//! Every cycle fabricates host, network and business metrics and writes them to
//! InfluxDB as one batch. Runs until Ctrl+C.
//!
//! # Usage
//! ```sh
//! INFLUXDB_TOKEN=... cargo run
//! ```
//!
//! # Environment Variables
//! - `INFLUXDB_TOKEN` - API token (required)
//! - `INFLUXDB_URL` - Server URL (default: http://localhost:8086)
//! - `INFLUXDB_ORG` / `INFLUXDB_BUCKET` - Write target (default: my-org / my-bucket)
//! - `EMIT_INTERVAL_MS` - Delay between cycles (default: 500)

use anyhow::{Context, Result};
use synthmetrics::application::{Interrupt, Startup, start};
use synthmetrics::infrastructure::InfluxSink;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with(stdout_layer)
        .init();

    info!("synthmetrics {} starting...", env!("CARGO_PKG_VERSION"));

    // Before any network I/O
    let mut interrupt = Interrupt::install().context("Unable to listen for shutdown signal")?;

    let Startup { sink, emitter, .. } =
        start(|key| std::env::var(key).ok(), InfluxSink::new).context("Startup failed")?;

    if let Err(e) = sink.ping().await {
        warn!("InfluxDB at {} did not answer /ping: {}", sink.base_url(), e);
    }
    info!("Connected to InfluxDB at {}", sink.base_url());

    emitter.run(interrupt.recv()).await;

    info!("Stopping script.");
    Ok(())
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
