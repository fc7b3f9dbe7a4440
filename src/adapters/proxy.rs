//! Self-hosted relay adapter: flat JSON with an `x-api-key` header.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

use super::{http_client, truncate, Device, DeviceStatus, UpstreamClient, UpstreamResult};
use crate::error::UpstreamError;

pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
    key: Zeroizing<String>,
}

impl ProxyClient {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> UpstreamResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: Zeroizing::new(key.to_string()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> UpstreamResult<T> {
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("x-api-key", self.key.as_str())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(path = %path, http_status = status.as_u16(), "relay response");
        parse_response(status, &body)
    }
}

#[async_trait]
impl UpstreamClient for ProxyClient {
    fn provider_id(&self) -> &str { "switchbot_proxy" }
    fn display_name(&self) -> &str { "Switchbot API Proxy" }

    async fn list_devices(&self) -> UpstreamResult<Vec<Device>> {
        self.get("devices").await
    }

    async fn status(&self, device_id: &str) -> UpstreamResult<DeviceStatus> {
        self.get(device_id).await
    }
}

fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> UpstreamResult<T> {
    let detail = || format!("HTTP {}: {}", status.as_u16(), truncate(body));
    if status.is_success() {
        Ok(serde_json::from_str(body)?)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err(UpstreamError::QuotaExceeded)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(UpstreamError::Auth(detail()))
    } else if status.is_server_error() {
        Err(UpstreamError::Transport(detail()))
    } else {
        Err(UpstreamError::Protocol(detail()))
    }
}
