//! Request signing for the SwitchBot cloud API (v1.1).
//!
//! Every request carries four headers:
//!
//!   Authorization: <token>
//!   t:             <unix time in milliseconds>
//!   nonce:         <random uuid>
//!   sign:          base64(HMAC-SHA256(secret, token + t + nonce))
//!
//! The secret itself never leaves this process.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::UpstreamError;

type HmacSha256 = Hmac<Sha256>;

/// Header values for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub t: String,
    pub nonce: String,
    pub sign: String,
}

impl SignedHeaders {
    /// Sign a request made right now with a fresh nonce.
    pub fn now(token: &str, secret: &str) -> Result<Self, UpstreamError> {
        let t = Utc::now().timestamp_millis().to_string();
        let nonce = uuid::Uuid::new_v4().to_string();
        let sign = sign(token, secret, &t, &nonce)?;
        Ok(Self { t, nonce, sign })
    }
}

/// Compute the `sign` header for the given token, timestamp and nonce.
pub fn sign(token: &str, secret: &str, t: &str, nonce: &str) -> Result<String, UpstreamError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| UpstreamError::Auth(format!("unusable secret: {}", e)))?;
    mac.update(token.as_bytes());
    mac.update(t.as_bytes());
    mac.update(nonce.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
