//! Startup wiring: configuration, self-metrics, sink, emitter.

use crate::application::emitter::Emitter;
use crate::config::{Config, ConfigError};
use crate::domain::errors::SinkError;
use crate::domain::ports::MetricSink;
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to register metrics: {0}")]
    Metrics(String),

    #[error("Failed to build sink: {0}")]
    Sink(#[from] SinkError),
}

/// Everything the binary needs once startup succeeded
pub struct Startup<S> {
    pub config: Config,
    pub sink: Arc<S>,
    pub emitter: Emitter,
}

/// Load configuration through `lookup`, then build the sink and the emitter.
///
/// `make_sink` is only called with a valid configuration, so a missing token
/// never opens a connection.
pub fn start<L, S, M>(lookup: L, make_sink: M) -> Result<Startup<S>, StartupError>
where
    L: Fn(&str) -> Option<String>,
    S: MetricSink + 'static,
    M: FnOnce(&Config) -> Result<S, SinkError>,
{
    let config = Config::from_lookup(lookup)?;
    info!(
        "Configuration loaded: org={}, bucket={}, interval={:?}",
        config.org, config.bucket, config.interval
    );

    let metrics = Metrics::new().map_err(|e| StartupError::Metrics(e.to_string()))?;
    let sink = Arc::new(make_sink(&config)?);
    let emitter = Emitter::new(&config, sink.clone(), metrics);

    Ok(Startup {
        config,
        sink,
        emitter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::InMemorySink;

    #[test]
    fn test_sink_failure_is_reported() {
        let result = start(
            |key| (key == "INFLUXDB_TOKEN").then(|| "t".to_string()),
            |_| -> Result<InMemorySink, SinkError> {
                Err(SinkError::Transport {
                    reason: "no tls backend".to_string(),
                })
            },
        );

        assert!(matches!(result, Err(StartupError::Sink(SinkError::Transport { .. }))));
    }

    #[test]
    fn test_sink_sees_loaded_config() {
        let startup = start(
            |key| match key {
                "INFLUXDB_TOKEN" => Some("t".to_string()),
                "INFLUXDB_BUCKET" => Some("synthetic".to_string()),
                _ => None,
            },
            |config| {
                assert_eq!(config.bucket, "synthetic");
                Ok(InMemorySink::new())
            },
        )
        .unwrap();

        assert_eq!(startup.config.bucket, "synthetic");
        assert_eq!(startup.sink.attempts(), 0);
    }
}
