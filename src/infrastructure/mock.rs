use crate::domain::errors::SinkError;
use crate::domain::point::Point;
use crate::domain::ports::{MetricSink, WriteTarget};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// A batch as received by [`InMemorySink`]
#[derive(Debug, Clone)]
pub struct RecordedBatch {
    pub target: WriteTarget,
    pub points: Vec<Point>,
}

/// Sink that keeps every accepted batch in memory.
///
/// `fail_next(n)` makes the next `n` writes fail with `Unreachable`; failed
/// batches are counted in `attempts` but not stored. `fail_close()` makes every
/// later `close` return an error; the call is still counted.
#[derive(Clone, Default)]
pub struct InMemorySink {
    batches: Arc<RwLock<Vec<RecordedBatch>>>,
    attempts: Arc<AtomicUsize>,
    pending_failures: Arc<AtomicUsize>,
    close_calls: Arc<AtomicUsize>,
    close_fails: Arc<AtomicBool>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_close(&self) {
        self.close_fails.store(true, Ordering::SeqCst);
    }

    pub async fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.read().await.clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }
}

#[async_trait]
impl MetricSink for InMemorySink {
    async fn write(&self, target: &WriteTarget, points: &[Point]) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SinkError::Unreachable {
                reason: "simulated outage".to_string(),
            });
        }

        self.batches.write().await.push(RecordedBatch {
            target: target.clone(),
            points: points.to_vec(),
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let previous = self.close_calls.fetch_add(1, Ordering::SeqCst);
        info!("InMemorySink: closed (call #{})", previous + 1);

        if self.close_fails.load(Ordering::SeqCst) {
            return Err(SinkError::Transport {
                reason: "simulated close failure".to_string(),
            });
        }
        Ok(())
    }
}
