//! SwitchBot cloud adapter: token + secret signed requests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

use super::{http_client, truncate, Device, DeviceStatus, UpstreamClient, UpstreamResult};
use crate::auth::SignedHeaders;
use crate::error::UpstreamError;

pub const DEFAULT_BASE_URL: &str = "https://api.switch-bot.com/v1.1";

/// Envelope status code meaning success.
const STATUS_OK: i64 = 100;

/// Response envelope: `{statusCode, message, body}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(alias = "statusCode", default)]
    status_code: Option<i64>,
    #[serde(default)]
    message: String,
    body: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DeviceListBody {
    #[serde(alias = "deviceList", default)]
    device_list: Vec<Device>,
}

pub struct DirectClient {
    client: reqwest::Client,
    base_url: String,
    token: Zeroizing<String>,
    secret: Zeroizing<String>,
}

impl DirectClient {
    pub fn new(token: &str, secret: &str, timeout: Duration) -> UpstreamResult<Self> {
        Self::with_base_url(token, secret, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(
        token: &str,
        secret: &str,
        base_url: &str,
        timeout: Duration,
    ) -> UpstreamResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Zeroizing::new(token.to_string()),
            secret: Zeroizing::new(secret.to_string()),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> UpstreamResult<T> {
        let headers = SignedHeaders::now(&self.token, &self.secret)?;
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .header("Authorization", self.token.as_str())
            .header("t", headers.t)
            .header("nonce", headers.nonce)
            .header("sign", headers.sign)
            .header("Content-Type", "application/json; charset=utf8")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(path = %path, http_status = status.as_u16(), "cloud response");
        parse_envelope(status, &body)
    }
}

#[async_trait]
impl UpstreamClient for DirectClient {
    fn provider_id(&self) -> &str { "switchbot" }
    fn display_name(&self) -> &str { "Switchbot API" }

    async fn list_devices(&self) -> UpstreamResult<Vec<Device>> {
        let body: DeviceListBody = self.get("devices").await?;
        Ok(body.device_list)
    }

    async fn status(&self, device_id: &str) -> UpstreamResult<DeviceStatus> {
        self.get(&format!("devices/{}/status", device_id)).await
    }
}

// ── Response Classification ─────────────────────────────────────────

/// Map an HTTP status + envelope into a body or a normalized error.
///
/// Quota text is only looked for once the response is known to be a
/// failure, so device names in a successful body never trip it.
fn parse_envelope<T: DeserializeOwned>(status: StatusCode, raw: &str) -> UpstreamResult<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<Envelope>(raw)
            .ok()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| truncate(raw).to_string());
        return Err(classify_http_status(status, &message));
    }

    let envelope: Envelope = serde_json::from_str(raw)?;
    match envelope.status_code {
        Some(STATUS_OK) => {
            let body = envelope
                .body
                .ok_or_else(|| UpstreamError::Protocol("envelope has no body".into()))?;
            Ok(serde_json::from_value(body)?)
        }
        Some(code) => Err(classify_status_code(code, &envelope.message)),
        None => Err(UpstreamError::Protocol("envelope has no status code".into())),
    }
}

/// Non-2xx HTTP responses.
fn classify_http_status(status: StatusCode, message: &str) -> UpstreamError {
    let detail = format!("HTTP {}: {}", status.as_u16(), message);
    if status == StatusCode::TOO_MANY_REQUESTS || is_quota_message(message) {
        UpstreamError::QuotaExceeded
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        UpstreamError::Auth(detail)
    } else if status.is_server_error() {
        UpstreamError::Transport(detail)
    } else {
        UpstreamError::Protocol(detail)
    }
}

/// Non-success envelope codes reported with HTTP 200.
fn classify_status_code(code: i64, message: &str) -> UpstreamError {
    if is_quota_message(message) {
        return UpstreamError::QuotaExceeded;
    }
    match code {
        // 161: device offline, 171: hub offline, 190: device internal error
        161 | 171 | 190 => UpstreamError::Transport(format!("status {}: {}", code, message)),
        401 => UpstreamError::Auth(format!("status {}: {}", code, message)),
        _ => UpstreamError::Protocol(format!("status {}: {}", code, message)),
    }
}

fn is_quota_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("daily limit") || lower.contains("too many requests")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let status: DeviceStatus = parse_envelope(
            StatusCode::OK,
            r#"{"status_code": 100, "body": {"temperature": 21.5}}"#,
        )
        .unwrap();
        assert_eq!(status.temperature, Some(21.5));
    }

    #[test]
    fn test_envelope_camel_case() {
        let body: DeviceListBody = parse_envelope(
            StatusCode::OK,
            r#"{"statusCode":100,"message":"success","body":{"deviceList":[
                {"deviceId":"A1","deviceName":"Office","deviceType":"Meter"}],
                "infraredRemoteList":[]}}"#,
        )
        .unwrap();
        assert_eq!(body.device_list.len(), 1);
        assert_eq!(body.device_list[0].device_id, "A1");
    }

    #[test]
    fn test_quota_by_http_status() {
        let err = parse_envelope::<DeviceStatus>(StatusCode::TOO_MANY_REQUESTS, "").unwrap_err();
        assert_eq!(err, UpstreamError::QuotaExceeded);
    }

    #[test]
    fn test_quota_by_message() {
        let err = parse_envelope::<DeviceStatus>(
            StatusCode::OK,
            r#"{"statusCode":190,"message":"Requests reached the daily limit","body":{}}"#,
        )
        .unwrap_err();
        assert_eq!(err, UpstreamError::QuotaExceeded);
    }

    #[test]
    fn test_unauthorized() {
        let err =
            parse_envelope::<DeviceStatus>(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthorized"}"#)
                .unwrap_err();
        assert!(matches!(err, UpstreamError::Auth(m) if m.contains("Unauthorized")));
    }

    #[test]
    fn test_server_error_is_transport() {
        let err = parse_envelope::<DeviceStatus>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[test]
    fn test_device_offline_is_transport() {
        let err = parse_envelope::<DeviceStatus>(
            StatusCode::OK,
            r#"{"statusCode":161,"message":"device offline","body":{}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[test]
    fn test_unknown_code_is_protocol() {
        let err = parse_envelope::<DeviceStatus>(
            StatusCode::OK,
            r#"{"statusCode":152,"message":"device not found","body":{}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(m) if m.contains("152")));
    }

    #[test]
    fn test_garbage_is_protocol() {
        let err = parse_envelope::<DeviceStatus>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(_)));
    }

    #[test]
    fn test_missing_body_is_protocol() {
        let err = parse_envelope::<DeviceStatus>(StatusCode::OK, r#"{"statusCode":100}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(_)));
    }

    #[test]
    fn test_success_with_quota_words_in_device_name() {
        let body: DeviceListBody = parse_envelope(
            StatusCode::OK,
            r#"{"status_code":100,"body":{"device_list":[
                {"device_id":"A","device_name":"Daily limit tester","device_type":"Meter"},
                {"device_id":"B","device_name":"Too many requests","device_type":"MeterPlus"}]}}"#,
        )
        .unwrap();
        assert_eq!(body.device_list.len(), 2);
        assert_eq!(body.device_list[0].device_name, "Daily limit tester");
    }

    #[test]
    fn test_quota_message_on_http_error_without_envelope() {
        let err = parse_envelope::<DeviceStatus>(
            StatusCode::BAD_REQUEST,
            "Requests reached the daily limit",
        )
        .unwrap_err();
        assert_eq!(err, UpstreamError::QuotaExceeded);
    }

    #[test]
    fn test_error_envelope_with_mismatched_body_is_classified() {
        let err = parse_envelope::<DeviceListBody>(
            StatusCode::OK,
            r#"{"statusCode":171,"message":"hub offline","body":"unavailable"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(m) if m.contains("171")));
    }
}
