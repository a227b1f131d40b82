use thiserror::Error;

/// Errors raised while turning points into line protocol
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EncodeError {
    #[error("Point has an empty measurement name")]
    EmptyMeasurement,

    #[error("Point {measurement} has no fields")]
    NoFields { measurement: String },

    #[error("Field {field} of {measurement} is not a finite number")]
    NonFiniteFloat { measurement: String, field: String },
}

/// Errors related to submitting a batch to the sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Write timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Batch rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to encode batch: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Sink is closed")]
    Closed,
}
