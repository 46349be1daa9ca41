//! # Live Monitoring Simulation
//!
//! Synthesizes a real-time view of household consumption from the device list.
//!
//! - **usage**: time-of-day usage factor per device category and the derived ON/STANDBY/OFF status
//! - **session**: run state, speed and a sliding window of power/cost samples
//!
//! The background ticker lives in [`crate::controller`].

pub mod session;
pub mod usage;

pub use session::{
    LiveDeviceStatus, SimulationPoint, SimulationSession, SimulationSnapshot, SimulationSpeed,
    DEFAULT_WINDOW,
};
pub use usage::{is_peak_hour, usage_factor, DeviceStatus, OFF_PEAK_FACTOR, PEAK_FACTOR};
