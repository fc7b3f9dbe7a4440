//! Upstream client trait: variant-agnostic access to SwitchBot devices.
//!
//! The cloud API (signed with token + secret) and the self-hosted relay
//! (API-key header) both implement this trait. Sensors only ever see the
//! trait object, never a concrete client.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Credentials;
use crate::error::UpstreamError;

pub mod direct;
pub mod proxy;

#[cfg(test)]
pub(crate) mod mock;

pub type UpstreamResult<T> = Result<T, UpstreamError>;

// ── Core Types ──────────────────────────────────────────────────────

/// Known SwitchBot device types. Anything we have no name for is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Meter,
    MeterPlus,
    MeterPro,
    MeterProCo2,
    OutdoorMeter,
    Hub2,
    HubMini,
    Bot,
    Curtain,
    Plug,
    Other(String),
}

impl DeviceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Meter => "Meter",
            Self::MeterPlus => "MeterPlus",
            Self::MeterPro => "MeterPro",
            Self::MeterProCo2 => "MeterPro(CO2)",
            Self::OutdoorMeter => "WoIOSensor",
            Self::Hub2 => "Hub 2",
            Self::HubMini => "Hub Mini",
            Self::Bot => "Bot",
            Self::Curtain => "Curtain",
            Self::Plug => "Plug",
            Self::Other(raw) => raw,
        }
    }

    /// Allow-list of device types that report temperature and humidity.
    pub fn reports_climate(&self) -> bool {
        matches!(
            self,
            Self::Meter
                | Self::MeterPlus
                | Self::MeterPro
                | Self::MeterProCo2
                | Self::OutdoorMeter
                | Self::Hub2
        )
    }
}

impl From<&str> for DeviceType {
    fn from(raw: &str) -> Self {
        match raw {
            "Meter" => Self::Meter,
            "MeterPlus" => Self::MeterPlus,
            "MeterPro" => Self::MeterPro,
            "MeterPro(CO2)" => Self::MeterProCo2,
            "WoIOSensor" => Self::OutdoorMeter,
            "Hub 2" => Self::Hub2,
            "Hub Mini" => Self::HubMini,
            "Bot" => Self::Bot,
            "Curtain" => Self::Curtain,
            "Plug" => Self::Plug,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// A device as reported by the device-list call.
///
/// The cloud API says `deviceId`, the relay says `deviceId`, and older
/// client libraries re-case everything to `device_id`; all three parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(alias = "deviceId")]
    pub device_id: String,
    #[serde(alias = "deviceName", default)]
    pub device_name: String,
    #[serde(alias = "deviceType", default = "unknown_device_type")]
    pub device_type: DeviceType,
}

fn unknown_device_type() -> DeviceType {
    DeviceType::Other(String::new())
}

/// Reading-bearing status of a single device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(alias = "deviceId", default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub battery: Option<u8>,
}

// ── Client Trait ────────────────────────────────────────────────────

/// The capability every upstream variant provides.
///
/// No retries happen here: one call is one round trip bounded by the
/// client's timeout, and one unit of the shared daily quota.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Prefix used to build sensor unique ids (e.g. "switchbot").
    fn provider_id(&self) -> &str;

    /// Human-readable title of this connection.
    fn display_name(&self) -> &str;

    /// Enumerate all devices on the account, in upstream order.
    async fn list_devices(&self) -> UpstreamResult<Vec<Device>>;

    /// Fetch the current status of one device.
    async fn status(&self, device_id: &str) -> UpstreamResult<DeviceStatus>;
}

/// Build the client matching the configured credentials.
pub fn from_credentials(
    credentials: &Credentials,
    timeout: Duration,
) -> UpstreamResult<Arc<dyn UpstreamClient>> {
    let client: Arc<dyn UpstreamClient> = match credentials {
        Credentials::Direct { token, secret } => {
            Arc::new(direct::DirectClient::new(token, secret, timeout)?)
        }
        Credentials::Proxy { url, key } => Arc::new(proxy::ProxyClient::new(url, key, timeout)?),
    };
    Ok(client)
}

/// Shared reqwest client construction with the per-call timeout applied.
pub(crate) fn http_client(timeout: Duration) -> UpstreamResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Transport(format!("cannot build HTTP client: {}", e)))
}

/// Keep error bodies short in messages and logs.
pub(crate) fn truncate(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_parses_both_casings() {
        let cloud: Device = serde_json::from_str(
            r#"{"deviceId":"C1","deviceName":"Kitchen","deviceType":"MeterPlus","hubDeviceId":"H1"}"#,
        )
        .unwrap();
        let legacy: Device = serde_json::from_str(
            r#"{"device_id":"C1","device_name":"Kitchen","device_type":"MeterPlus"}"#,
        )
        .unwrap();
        assert_eq!(cloud, legacy);
        assert_eq!(cloud.device_type, DeviceType::MeterPlus);
    }

    #[test]
    fn test_unknown_device_type_is_kept() {
        let dev: Device =
            serde_json::from_str(r#"{"deviceId":"X","deviceName":"Lamp","deviceType":"Color Bulb"}"#)
                .unwrap();
        assert_eq!(dev.device_type, DeviceType::Other("Color Bulb".into()));
        assert!(!dev.device_type.reports_climate());
        assert_eq!(dev.device_type.to_string(), "Color Bulb");
    }

    #[test]
    fn test_missing_device_type_is_unsupported() {
        let dev: Device = serde_json::from_str(r#"{"deviceId":"X"}"#).unwrap();
        assert!(!dev.device_type.reports_climate());
    }

    #[test]
    fn test_climate_allow_list() {
        for raw in ["Meter", "MeterPlus", "MeterPro", "MeterPro(CO2)", "WoIOSensor", "Hub 2"] {
            assert!(DeviceType::from(raw).reports_climate(), "{} should report climate", raw);
            assert_eq!(DeviceType::from(raw).as_str(), raw);
        }
        for raw in ["Bot", "Curtain", "Hub Mini", "Plug", "Smart Lock"] {
            assert!(!DeviceType::from(raw).reports_climate(), "{} should be skipped", raw);
        }
    }

    #[test]
    fn test_status_fields_are_optional() {
        let status: DeviceStatus = serde_json::from_str(r#"{"temperature": 21.5}"#).unwrap();
        assert_eq!(status.temperature, Some(21.5));
        assert_eq!(status.humidity, None);
        assert_eq!(status.device_id, None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(600);
        assert_eq!(truncate(&long).chars().count(), 500);
        assert_eq!(truncate("short"), "short");
    }
}
