//! Quota planner: turns a fixed daily request ceiling into the minimum
//! interval every poller sharing that ceiling must respect.
//!
//! One slot of the ceiling is reserved for the device-list call made at
//! discovery; the rest is split evenly across pollers:
//!
//!   interval = 86400 / (ceiling / (pollers + 1))
//!
//! The split is deliberately uniform. Every sensor pays an equal share of
//! the discovery slot regardless of what its own calls cost.

use serde::Serialize;
use std::num::NonZeroU32;
use std::time::Duration;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Daily ceiling the SwitchBot cloud grants per account.
pub const DEFAULT_DAILY_REQUEST_CEILING: u32 = 10_000;

/// Minimum seconds between two polls of the same sensor.
///
/// Strictly positive for any non-zero ceiling, and non-decreasing in
/// `poller_count`.
pub fn compute(daily_request_ceiling: NonZeroU32, poller_count: usize) -> f64 {
    let requests_per_cycle = poller_count as f64 + 1.0;
    let cycles_per_day = f64::from(daily_request_ceiling.get()) / requests_per_cycle;
    SECONDS_PER_DAY / cycles_per_day
}

/// The plan produced once per discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaPlan {
    pub daily_request_ceiling: u32,
    pub poller_count: usize,
    pub interval_secs: f64,
}

impl QuotaPlan {
    pub fn new(daily_request_ceiling: NonZeroU32, poller_count: usize) -> Self {
        Self {
            daily_request_ceiling: daily_request_ceiling.get(),
            poller_count,
            interval_secs: compute(daily_request_ceiling, poller_count),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    /// How many times per day each poller may refresh.
    pub fn refreshes_per_day(&self) -> f64 {
        SECONDS_PER_DAY / self.interval_secs
    }
}
