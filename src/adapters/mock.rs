//! Scripted in-memory client for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Device, DeviceStatus, DeviceType, UpstreamClient, UpstreamResult};
use crate::error::UpstreamError;

pub(crate) struct MockClient {
    devices: Mutex<UpstreamResult<Vec<Device>>>,
    statuses: Mutex<VecDeque<UpstreamResult<DeviceStatus>>>,
    list_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self {
            devices: Mutex::new(Ok(Vec::new())),
            statuses: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_devices(self, devices: Vec<Device>) -> Self {
        *self.devices.lock().unwrap() = Ok(devices);
        self
    }

    pub(crate) fn failing_discovery(self, err: UpstreamError) -> Self {
        *self.devices.lock().unwrap() = Err(err);
        self
    }

    /// Queue the result of the next `status` call.
    pub(crate) fn push_status(&self, result: UpstreamResult<DeviceStatus>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn device(id: &str, name: &str, device_type: &str) -> Device {
    Device {
        device_id: id.into(),
        device_name: name.into(),
        device_type: DeviceType::from(device_type),
    }
}

pub(crate) fn climate(temperature: f64, humidity: f64) -> DeviceStatus {
    DeviceStatus {
        device_id: None,
        temperature: Some(temperature),
        humidity: Some(humidity),
        battery: None,
    }
}

#[async_trait]
impl UpstreamClient for MockClient {
    fn provider_id(&self) -> &str { "switchbot" }
    fn display_name(&self) -> &str { "Mock" }

    async fn list_devices(&self) -> UpstreamResult<Vec<Device>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.devices.lock().unwrap().clone()
    }

    async fn status(&self, _device_id: &str) -> UpstreamResult<DeviceStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::Transport("no scripted response".into())))
    }
}
