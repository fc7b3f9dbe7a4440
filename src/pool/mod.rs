//! The shared quota pool and the sensors drawing from it.
//!
//! Every sensor in a discovery batch polls on the same interval, computed
//! once from the daily ceiling and the final poller count.

pub mod quota;
pub mod sensor;

pub use quota::QuotaPlan;
pub use sensor::{MeasurementKind, PollOutcome, PollState, PollableSensor, Reading, SensorSnapshot};
