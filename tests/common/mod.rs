//! WireMock-based SwitchBot cloud and relay mocks.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const SECRET: &str = "test-secret";
pub const API_KEY: &str = "relay-key";

/// Three climate devices and one curtain, in relay (flat) casing.
pub fn relay_devices() -> Value {
    json!([
        {"deviceId": "M1", "deviceName": "Living room", "deviceType": "MeterPlus"},
        {"deviceId": "M2", "deviceName": "Garden", "deviceType": "WoIOSensor"},
        {"deviceId": "C1", "deviceName": "Blinds", "deviceType": "Curtain"},
        {"deviceId": "M3", "deviceName": "Office", "deviceType": "Meter"}
    ])
}

/// Same devices in the cloud envelope.
pub fn cloud_devices() -> Value {
    json!({
        "statusCode": 100,
        "message": "success",
        "body": {
            "deviceList": relay_devices(),
            "infraredRemoteList": []
        }
    })
}

pub fn cloud_status(temperature: f64, humidity: f64) -> Value {
    json!({
        "statusCode": 100,
        "message": "success",
        "body": {
            "deviceId": "M1",
            "deviceType": "MeterPlus",
            "temperature": temperature,
            "humidity": humidity,
            "battery": 87
        }
    })
}

/// Mock SwitchBot cloud. Only correctly signed requests match.
pub struct MockCloud {
    pub server: MockServer,
}

impl MockCloud {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn respond(&self, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("Authorization", TOKEN))
            .and(header_exists("sign"))
            .and(header_exists("nonce"))
            .and(header_exists("t"))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}

/// Mock self-hosted relay. Only requests carrying the API key match.
pub struct MockRelay {
    pub server: MockServer,
}

impl MockRelay {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn respond(&self, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("x-api-key", API_KEY))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    pub async fn respond_times(&self, route: &str, template: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("x-api-key", API_KEY))
            .respond_with(template)
            .expect(times)
            .mount(&self.server)
            .await;
    }
}
