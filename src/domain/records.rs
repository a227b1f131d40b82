//! The three record groups produced each cycle and their point layouts.

use crate::config::TagConfig;
use crate::domain::point::Point;

pub const HOST_MEASUREMENT: &str = "system_stats";
pub const LINK_MEASUREMENT: &str = "network_stats";
pub const BUSINESS_MEASUREMENT: &str = "business_stats";

/// Simulated host resource usage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostStats {
    pub cpu_usage: f64,
    pub mem_usage: f64,
    pub temperature: f64,
    pub battery_level: f64,
}

/// Simulated disk and network throughput
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStats {
    pub disk_io: f64,
    pub net_in: f64,
    pub net_out: f64,
}

/// Simulated business activity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusinessStats {
    pub active_users: i64,
    pub transactions_sec: f64,
    pub errors_sec: f64,
}

/// Everything generated in one cycle, sharing one capture timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub timestamp_ns: i64,
    pub host: HostStats,
    pub link: LinkStats,
    pub business: BusinessStats,
}

impl Snapshot {
    /// Build the batch for this cycle. Every point carries `timestamp_ns`.
    pub fn to_points(&self, tags: &TagConfig) -> Vec<Point> {
        vec![
            Point::new(HOST_MEASUREMENT)
                .tag("host", tags.host.as_str())
                .field("cpu_usage", self.host.cpu_usage)
                .field("mem_usage", self.host.mem_usage)
                .field("temperature", self.host.temperature)
                .field("battery_level", self.host.battery_level)
                .timestamp(self.timestamp_ns),
            Point::new(LINK_MEASUREMENT)
                .tag("interface", tags.interface.as_str())
                .field("disk_io", self.link.disk_io)
                .field("net_in", self.link.net_in)
                .field("net_out", self.link.net_out)
                .timestamp(self.timestamp_ns),
            Point::new(BUSINESS_MEASUREMENT)
                .tag("region", tags.region.as_str())
                .field("active_users", self.business.active_users)
                .field("transactions_sec", self.business.transactions_sec)
                .field("errors_sec", self.business.errors_sec)
                .timestamp(self.timestamp_ns),
        ]
    }

    /// Progress line printed after a successful write.
    pub fn summary(&self) -> String {
        format!(
            "Sent metrics: CPU={:.1}%, Users={}, errors={:.1}",
            self.host.cpu_usage, self.business.active_users, self.business.errors_sec
        )
    }
}
