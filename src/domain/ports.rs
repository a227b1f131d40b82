use crate::domain::errors::SinkError;
use crate::domain::point::Point;
use async_trait::async_trait;

/// Destination of a batch write: bucket within an organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub bucket: String,
    pub org: String,
}

impl WriteTarget {
    pub fn new(bucket: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            org: org.into(),
        }
    }
}

/// Time-series storage receiving generated batches.
///
/// `write` submits the whole batch in one call. `close` releases the connection;
/// writes after it fail with [`SinkError::Closed`].
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn write(&self, target: &WriteTarget, points: &[Point]) -> Result<(), SinkError>;
    async fn close(&self) -> Result<(), SinkError>;
}
