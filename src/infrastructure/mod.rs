pub mod influx;
pub mod mock;
pub mod observability;

pub use influx::InfluxSink;
pub use mock::InMemorySink;
