//! Discovery and polling.
//!
//! - `registry`: one-shot device enumeration that builds the sensor set
//!   and its shared quota plan
//! - `poller`: the tick loop that drives every sensor's refresh

pub mod poller;
pub mod registry;

pub use registry::SensorRegistry;
