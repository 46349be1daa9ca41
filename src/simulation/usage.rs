use serde::{Deserialize, Serialize};
use strum::Display;

use crate::domain::{Device, DeviceCategory};

/// Usage factor inside a category's peak window
pub const PEAK_FACTOR: f64 = 0.8;
/// Usage factor outside the peak window
pub const OFF_PEAK_FACTOR: f64 = 0.2;

/// Device types that never cycle off
const ALWAYS_ON_TYPES: [&str; 1] = ["Refrigerator"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DeviceStatus {
    On,
    Standby,
    Off,
}

impl DeviceStatus {
    pub fn from_factor(factor: f64) -> Self {
        if factor > 0.5 {
            DeviceStatus::On
        } else if factor > 0.1 {
            DeviceStatus::Standby
        } else {
            DeviceStatus::Off
        }
    }
}

/// Whether `hour` (0-23) falls in the category's typical usage window.
///
/// Categories without a known pattern are treated as always in use.
pub fn is_peak_hour(category: DeviceCategory, hour: u32) -> bool {
    match category {
        DeviceCategory::Cooling => matches!(hour, 12..=17 | 22..=23 | 0..=5),
        DeviceCategory::Entertainment => matches!(hour, 18..=23),
        DeviceCategory::Kitchen => matches!(hour, 6..=8 | 17..=20),
        DeviceCategory::Lighting => matches!(hour, 18..=23 | 0..=6),
        _ => hour < 24,
    }
}

/// Fraction of rated power a device draws at `hour`.
pub fn usage_factor(device: &Device, hour: u32) -> f64 {
    if ALWAYS_ON_TYPES.contains(&device.device_type.as_str()) {
        return 1.0;
    }
    if is_peak_hour(device.category, hour) {
        PEAK_FACTOR
    } else {
        OFF_PEAK_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceCatalog;
    use rstest::rstest;

    fn device(kind: &str) -> Device {
        Device::from_spec(DeviceCatalog::builtin().get(kind).unwrap(), 1, 1, 4.0)
    }

    #[rstest]
    #[case("Air Conditioner", 14, 0.8)]
    #[case("Air Conditioner", 9, 0.2)]
    #[case("Air Conditioner", 3, 0.8)]
    #[case("Television", 20, 0.8)]
    #[case("Television", 10, 0.2)]
    #[case("Microwave", 7, 0.8)]
    #[case("Microwave", 12, 0.2)]
    #[case("LED Bulb", 6, 0.8)]
    #[case("LED Bulb", 7, 0.2)]
    #[case("Water Heater", 11, 0.8)]
    #[case("Refrigerator", 11, 1.0)]
    fn test_usage_factor(#[case] kind: &str, #[case] hour: u32, #[case] expected: f64) {
        assert_eq!(usage_factor(&device(kind), hour), expected);
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(DeviceStatus::from_factor(1.0), DeviceStatus::On);
        assert_eq!(DeviceStatus::from_factor(0.8), DeviceStatus::On);
        assert_eq!(DeviceStatus::from_factor(0.5), DeviceStatus::Standby);
        assert_eq!(DeviceStatus::from_factor(0.2), DeviceStatus::Standby);
        assert_eq!(DeviceStatus::from_factor(0.1), DeviceStatus::Off);
        assert_eq!(DeviceStatus::Standby.to_string(), "STANDBY");
    }
}
