//! Pollable sensor: one per (device, measurement kind).
//!
//! Each host tick either serves the cached reading (Fresh) or makes one
//! live status call (Stale). Quota exhaustion is absorbed without moving
//! the refresh clock, so the very next tick tries again; the quota resets
//! at the day boundary, not on our interval.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::{Device, DeviceStatus, UpstreamClient};
use crate::error::UpstreamError;

// ── Measurement Kind ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Temperature,
    Humidity,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; 2] = [MeasurementKind::Temperature, MeasurementKind::Humidity];

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
        }
    }

    /// Host-facing device class; doubles as the unique-id infix.
    pub fn device_class(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }

    pub fn extract(&self, status: &DeviceStatus) -> Option<f64> {
        match self {
            Self::Temperature => status.temperature,
            Self::Humidity => status.humidity,
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.device_class())
    }
}

// ── State ───────────────────────────────────────────────────────────

/// A single measurement. Superseded, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub kind: MeasurementKind,
    pub value: f64,
    pub captured_at: DateTime<Utc>,
}

/// Per-sensor mutable state. Lives as long as the sensor, never persisted.
#[derive(Debug, Clone)]
pub struct PollState {
    last_value: Option<Reading>,
    last_refresh_at: Option<DateTime<Utc>>,
    refresh_interval_secs: f64,
}

impl PollState {
    pub fn new(refresh_interval_secs: f64) -> Self {
        Self {
            last_value: None,
            last_refresh_at: None,
            refresh_interval_secs,
        }
    }

    pub fn last_value(&self) -> Option<&Reading> {
        self.last_value.as_ref()
    }

    pub fn last_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.last_refresh_at
    }

    pub fn refresh_interval_secs(&self) -> f64 {
        self.refresh_interval_secs
    }

    /// Whether a live poll is due at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_refresh_at else {
            return true;
        };
        let elapsed_ms = (now - last).num_milliseconds();
        // A clock that moved backwards must not freeze the sensor.
        elapsed_ms < 0 || elapsed_ms as f64 / 1000.0 >= self.refresh_interval_secs
    }

    fn record(&mut self, reading: Reading) {
        self.last_refresh_at = Some(reading.captured_at);
        self.last_value = Some(reading);
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A live call succeeded and the value was replaced.
    Refreshed,
    /// Still within the interval; no call was made.
    Cached,
    /// The live call hit the daily quota; cached value kept, clock untouched.
    QuotaDeferred,
}

// ── Sensor ──────────────────────────────────────────────────────────

/// Host-facing view of one sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    pub unique_id: String,
    pub name: String,
    pub device_class: &'static str,
    pub unit_of_measurement: &'static str,
    pub value: Option<f64>,
    pub last_refresh_at: Option<DateTime<Utc>>,
}

/// One (device, measurement kind) poller.
///
/// `update` takes `&mut self`: a sensor is never refreshed concurrently
/// with itself.
pub struct PollableSensor {
    client: Arc<dyn UpstreamClient>,
    device: Arc<Device>,
    kind: MeasurementKind,
    unique_id: String,
    state: PollState,
}

impl PollableSensor {
    pub fn new(
        client: Arc<dyn UpstreamClient>,
        device: Arc<Device>,
        kind: MeasurementKind,
        refresh_interval_secs: f64,
    ) -> Self {
        let unique_id = format!(
            "{}_{}_{}",
            client.provider_id(),
            kind.device_class(),
            device.device_id
        );
        Self {
            client,
            device,
            kind,
            unique_id,
            state: PollState::new(refresh_interval_secs),
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.device.device_name
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn measurement_kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        self.kind.unit()
    }

    pub fn device_class(&self) -> &'static str {
        self.kind.device_class()
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Last known value, `None` before the first successful poll.
    pub fn current_value(&self) -> Option<f64> {
        self.state.last_value().map(|r| r.value)
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            unique_id: self.unique_id.clone(),
            name: self.device.device_name.clone(),
            device_class: self.device_class(),
            unit_of_measurement: self.unit_of_measurement(),
            value: self.current_value(),
            last_refresh_at: self.state.last_refresh_at(),
        }
    }

    pub async fn update(&mut self) -> Result<PollOutcome, UpstreamError> {
        self.update_at(Utc::now()).await
    }

    /// One host tick at `now`.
    ///
    /// Auth, transport and protocol failures propagate and leave the
    /// cached value untouched.
    pub async fn update_at(&mut self, now: DateTime<Utc>) -> Result<PollOutcome, UpstreamError> {
        if !self.state.is_stale(now) {
            return Ok(PollOutcome::Cached);
        }

        let status = match self.client.status(&self.device.device_id).await {
            Ok(status) => status,
            Err(UpstreamError::QuotaExceeded) => {
                debug!(
                    unique_id = %self.unique_id,
                    "Daily quota exhausted, keeping cached value"
                );
                return Ok(PollOutcome::QuotaDeferred);
            }
            Err(e) => return Err(e),
        };

        let value = self.kind.extract(&status).ok_or_else(|| {
            UpstreamError::Protocol(format!(
                "status of device {} has no {} field",
                self.device.device_id, self.kind
            ))
        })?;

        self.state.record(Reading {
            kind: self.kind,
            value,
            captured_at: now,
        });
        info!(
            unique_id = %self.unique_id,
            value = value,
            unit = self.kind.unit(),
            "Sensor refreshed"
        );
        Ok(PollOutcome::Refreshed)
    }
}
