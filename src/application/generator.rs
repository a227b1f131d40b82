//! Synthetic metric generation.
//!
//! Random draws come from an injected [`Rng`] so tests can seed it; the derived
//! quantities (temperature, battery, transactions, errors) are plain functions.

use crate::domain::records::{BusinessStats, HostStats, LinkStats, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::function::erf::erf_inv;
use std::f64::consts::SQRT_2;

pub const CPU_RANGE: (f64, f64) = (10.0, 90.0);
pub const MEM_RANGE: (f64, f64) = (20.0, 85.0);
pub const TEMPERATURE_NOISE: f64 = 2.0;
pub const DISK_IO_RANGE: (f64, f64) = (0.1, 5.0);
pub const NET_IN_RANGE: (f64, f64) = (0.5, 100.0);
pub const NET_OUT_RANGE: (f64, f64) = (0.5, 50.0);
pub const ACTIVE_USERS_MEAN: f64 = 500.0;
pub const ACTIVE_USERS_STDDEV: f64 = 50.0;
pub const TRANSACTION_NOISE: (f64, f64) = (-10.0, 10.0);
pub const ERROR_NOISE: (f64, f64) = (-1.0, 2.0);

const NANOS_PER_SEC: i64 = 1_000_000_000;
const SECS_PER_HOUR: i64 = 3_600;

/// `35 + 0.4 * cpu_usage`, shifted by noise.
pub fn temperature(cpu_usage: f64, noise: f64) -> f64 {
    35.0 + cpu_usage * 0.4 + noise
}

/// Hourly sawtooth: 100 at the top of each wall-clock hour, draining to ~0 by its end.
pub fn battery_level(timestamp_ns: i64) -> f64 {
    let into_hour_ns = timestamp_ns.rem_euclid(SECS_PER_HOUR * NANOS_PER_SEC);
    let into_hour_secs = into_hour_ns as f64 / NANOS_PER_SEC as f64;
    (100.0 - into_hour_secs / 36.0).clamp(0.0, 100.0)
}

/// Roughly a tenth of active users transact each second. Never negative.
pub fn transactions_per_sec(active_users: i64, noise: f64) -> f64 {
    (active_users as f64 * 0.1 + noise).max(0.0)
}

/// About 2% of transactions fail. Never negative.
pub fn errors_per_sec(transactions_sec: f64, noise: f64) -> f64 {
    (transactions_sec * 0.02 + noise).max(0.0)
}

/// Produces one [`Snapshot`] per call.
pub struct MetricGenerator<R: Rng = StdRng> {
    rng: R,
}

impl MetricGenerator<StdRng> {
    /// Generator seeded from the OS entropy source
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic generator for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MetricGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate all three record groups for one capture timestamp.
    pub fn snapshot(&mut self, timestamp_ns: i64) -> Snapshot {
        Snapshot {
            timestamp_ns,
            host: self.host_stats(timestamp_ns),
            link: self.link_stats(),
            business: self.business_stats(),
        }
    }

    fn host_stats(&mut self, timestamp_ns: i64) -> HostStats {
        let cpu_usage = self.uniform(CPU_RANGE);
        let mem_usage = self.uniform(MEM_RANGE);
        let noise = self.uniform((-TEMPERATURE_NOISE, TEMPERATURE_NOISE));

        HostStats {
            cpu_usage,
            mem_usage,
            temperature: temperature(cpu_usage, noise),
            battery_level: battery_level(timestamp_ns),
        }
    }

    fn link_stats(&mut self) -> LinkStats {
        LinkStats {
            disk_io: self.uniform(DISK_IO_RANGE),
            net_in: self.uniform(NET_IN_RANGE),
            net_out: self.uniform(NET_OUT_RANGE),
        }
    }

    fn business_stats(&mut self) -> BusinessStats {
        // truncates toward zero like an int() cast
        let active_users = self.gaussian(ACTIVE_USERS_MEAN, ACTIVE_USERS_STDDEV) as i64;
        let transactions_sec =
            transactions_per_sec(active_users, self.uniform(TRANSACTION_NOISE));
        let errors_sec = errors_per_sec(transactions_sec, self.uniform(ERROR_NOISE));

        BusinessStats {
            active_users,
            transactions_sec,
            errors_sec,
        }
    }

    fn uniform(&mut self, (low, high): (f64, f64)) -> f64 {
        self.rng.random_range(low..=high)
    }

    /// Inverse-CDF sampling of a normal distribution.
    fn gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        // open interval keeps erf_inv finite
        let u: f64 = self.rng.random_range(f64::EPSILON..1.0);
        mean + stddev * SQRT_2 * erf_inv(2.0 * u - 1.0)
    }
}
