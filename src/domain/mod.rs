// Time-series record model
pub mod point;

// Wire encoding for the sink
pub mod line_protocol;

// Generated record groups
pub mod records;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
