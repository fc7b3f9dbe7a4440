//! One-time setup check: a single authenticating call decides whether
//! the supplied credentials are accepted. The device list it fetches is
//! handed on to discovery so startup spends one call, not two.

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{Device, UpstreamClient};
use crate::error::SetupError;

/// What a successful setup reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupInfo {
    pub title: String,
    pub device_count: usize,
    #[serde(skip)]
    pub devices: Vec<Device>,
}

/// Validate credentials with one device-list call.
pub async fn validate(client: &dyn UpstreamClient) -> Result<SetupInfo, SetupError> {
    match client.list_devices().await {
        Ok(devices) => {
            info!(
                provider = %client.provider_id(),
                devices = devices.len(),
                "🔐 Credentials accepted"
            );
            Ok(SetupInfo {
                title: client.display_name().to_string(),
                device_count: devices.len(),
                devices,
            })
        }
        Err(e) => {
            let err = SetupError::from(e);
            warn!(provider = %client.provider_id(), code = err.code(), "Setup validation failed: {}", err);
            Err(err)
        }
    }
}
