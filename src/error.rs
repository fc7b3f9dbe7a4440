//! Error taxonomy shared by the upstream clients, the sensors and the
//! discovery pass.
//!
//! Only `Auth` and `Discovery` failures are meant to reach an operator.
//! `QuotaExceeded` is steady-state once the daily budget is spent and is
//! absorbed by the sensors.

use thiserror::Error;

/// Normalized failure of a single upstream call (direct or proxy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Credentials were rejected.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Network failure, timeout or upstream 5xx.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response could not be parsed into the expected shape.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The caller's daily request limit has been reached.
    #[error("daily request quota exhausted")]
    QuotaExceeded,
}

impl UpstreamError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::QuotaExceeded => "quota_exceeded",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Protocol(err.to_string())
        } else if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// The device-list call failed while building the sensor set. No sensors
/// are created when this is returned.
#[derive(Debug, Error)]
#[error("device discovery failed: {source}")]
pub struct DiscoveryError {
    #[from]
    source: UpstreamError,
}

impl DiscoveryError {
    pub fn upstream(&self) -> &UpstreamError {
        &self.source
    }
}

/// Outcome of validating credentials during setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("the provided credentials were rejected")]
    InvalidAuth,

    #[error("cannot connect: {0}")]
    CannotConnect(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl SetupError {
    /// Stable code reported back to the setup form.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::CannotConnect(_) => "cannot_connect",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<UpstreamError> for SetupError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Auth(_) => Self::InvalidAuth,
            UpstreamError::Transport(msg) => Self::CannotConnect(msg),
            UpstreamError::QuotaExceeded => Self::CannotConnect(err.to_string()),
            UpstreamError::Protocol(msg) => Self::Unknown(msg),
        }
    }
}
