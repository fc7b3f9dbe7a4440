//! Sensor registry: one-shot enumeration of climate devices.
//!
//! Lists devices once, keeps the ones on the climate allow-list, plans
//! the quota for `2 × matching devices` pollers and builds one
//! temperature and one humidity sensor per device. A failed device-list
//! call aborts the whole batch.
//!
//! The poller count is a startup snapshot: devices added later are only
//! picked up (and the interval only recomputed) by a new discovery pass.

use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::adapters::{Device, UpstreamClient};
use crate::error::DiscoveryError;
use crate::pool::{MeasurementKind, PollableSensor, QuotaPlan};

pub struct SensorRegistry {
    devices: Vec<Arc<Device>>,
    sensors: Vec<PollableSensor>,
    plan: QuotaPlan,
}

impl SensorRegistry {
    pub async fn discover(
        client: Arc<dyn UpstreamClient>,
        daily_request_ceiling: NonZeroU32,
    ) -> Result<Self, DiscoveryError> {
        let listed = client.list_devices().await.map_err(|e| {
            error!(provider = %client.provider_id(), error = %e, "Device discovery failed");
            DiscoveryError::from(e)
        })?;
        Ok(Self::from_devices(client, listed, daily_request_ceiling))
    }

    /// Build from a device list that was already fetched (e.g. during
    /// setup validation). Makes no upstream calls.
    pub fn from_devices(
        client: Arc<dyn UpstreamClient>,
        listed: Vec<Device>,
        daily_request_ceiling: NonZeroU32,
    ) -> Self {
        let total = listed.len();

        let devices: Vec<Arc<Device>> = listed
            .into_iter()
            .filter(|d| {
                let supported = d.device_type.reports_climate();
                if !supported {
                    debug!(
                        device_id = %d.device_id,
                        device_type = %d.device_type,
                        "Skipping device without climate readings"
                    );
                }
                supported
            })
            .map(Arc::new)
            .collect();

        let poller_count = devices.len() * MeasurementKind::ALL.len();
        let plan = QuotaPlan::new(daily_request_ceiling, poller_count);

        let mut sensors = Vec::with_capacity(poller_count);
        for device in &devices {
            for kind in MeasurementKind::ALL {
                sensors.push(PollableSensor::new(
                    Arc::clone(&client),
                    Arc::clone(device),
                    kind,
                    plan.interval_secs,
                ));
            }
        }

        info!(
            provider = %client.provider_id(),
            listed = total,
            supported = devices.len(),
            sensors = poller_count,
            interval_secs = format!("{:.2}", plan.interval_secs),
            "📡 Discovery complete"
        );

        Self { devices, sensors, plan }
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn sensors(&self) -> &[PollableSensor] {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut [PollableSensor] {
        &mut self.sensors
    }

    pub fn plan(&self) -> &QuotaPlan {
        &self.plan
    }

    pub fn into_sensors(self) -> Vec<PollableSensor> {
        self.sensors
    }
}
