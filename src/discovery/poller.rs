//! Host tick driver: refreshes every sensor on a fixed cadence.
//!
//! The sensors decide "poll or serve cached" themselves; this loop only
//! supplies the ticks. A failing sensor is logged and skipped so that one
//! flaky call never takes the others down.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::UpstreamError;
use crate::pool::{PollOutcome, PollableSensor};

/// Counts of what one or more ticks did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub refreshed: usize,
    pub cached: usize,
    pub quota_deferred: usize,
    pub failed: usize,
}

impl TickSummary {
    pub fn merge(&mut self, other: TickSummary) {
        self.refreshed += other.refreshed;
        self.cached += other.cached;
        self.quota_deferred += other.quota_deferred;
        self.failed += other.failed;
    }
}

/// Run one tick across all sensors at `now`.
pub async fn refresh_all(sensors: &mut [PollableSensor], now: DateTime<Utc>) -> TickSummary {
    let mut summary = TickSummary::default();

    for sensor in sensors.iter_mut() {
        match sensor.update_at(now).await {
            Ok(PollOutcome::Refreshed) => summary.refreshed += 1,
            Ok(PollOutcome::Cached) => summary.cached += 1,
            Ok(PollOutcome::QuotaDeferred) => summary.quota_deferred += 1,
            Err(e @ UpstreamError::Auth(_)) => {
                summary.failed += 1;
                error!(unique_id = %sensor.unique_id(), "Credentials rejected during update: {}", e);
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    unique_id = %sensor.unique_id(),
                    error_kind = e.kind(),
                    "Sensor update failed: {}",
                    e
                );
            }
        }
    }

    summary
}

/// Tick every `tick` until `shutdown` resolves. Returns the totals.
pub async fn run_poller<F>(
    sensors: &mut [PollableSensor],
    tick: Duration,
    shutdown: F,
) -> TickSummary
where
    F: Future<Output = ()>,
{
    info!(
        sensors = sensors.len(),
        tick_secs = tick.as_secs_f64(),
        "📡 Poller starting"
    );

    let mut totals = TickSummary::default();
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                let summary = refresh_all(sensors, Utc::now()).await;
                if summary.quota_deferred > 0 {
                    debug!(deferred = summary.quota_deferred, "Quota exhausted for some sensors");
                }
                debug!(
                    refreshed = summary.refreshed,
                    cached = summary.cached,
                    failed = summary.failed,
                    "Tick complete"
                );
                totals.merge(summary);
            }
        }
    }

    info!(
        refreshed = totals.refreshed,
        cached = totals.cached,
        quota_deferred = totals.quota_deferred,
        failed = totals.failed,
        "📡 Poller stopped"
    );
    totals
}
