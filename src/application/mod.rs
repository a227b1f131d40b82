// Synthetic value generation
pub mod generator;

// Emit loop
pub mod emitter;

// Startup wiring and Ctrl+C handling
pub mod bootstrap;
pub mod shutdown;

pub use bootstrap::{Startup, StartupError, start};
pub use emitter::{CycleOutcome, Emitter};
pub use generator::MetricGenerator;
pub use shutdown::Interrupt;
