//! SwitchBot Bridge: quota-aware polling of SwitchBot climate sensors.
//!
//! Devices are read through the SwitchBot cloud API (token + secret) or a
//! self-hosted relay (API key). Every (device, measurement) pair becomes a
//! sensor that the host refreshes on its own ticks; each sensor decides
//! whether a live call is due under a shared daily request budget.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pool;
pub mod setup;

pub use adapters::{Device, DeviceStatus, DeviceType, UpstreamClient};
pub use config::{Config, Credentials};
pub use discovery::SensorRegistry;
pub use error::{DiscoveryError, SetupError, UpstreamError};
pub use pool::{MeasurementKind, PollOutcome, PollableSensor, QuotaPlan, Reading};
