//! Push-based observability for the emitter
//!
//! Nothing listens for scrapes: counters are kept in-process and summarised to the
//! log when the loop stops.

pub mod metrics;

pub use metrics::{Metrics, MetricsSummary};
