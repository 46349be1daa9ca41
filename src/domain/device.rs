use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use super::types::{Energy, Power};

/// Household rated power above which a device mix is flagged.
pub const HOUSEHOLD_POWER_LIMIT_W: f64 = 5000.0;

/// Thermal sensitivity used for unknown device types.
pub const DEFAULT_THERMAL_SENSITIVITY: f64 = 0.02;

/// Billing period length used by the dashboard.
pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;

/// Appliance category, drives thermal coefficients and usage patterns
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DeviceCategory {
    Cooling,
    Heating,
    Kitchen,
    Entertainment,
    Lighting,
    Laundry,
    Electronics,
    Personal,
    Cleaning,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UsagePattern {
    Continuous,
    Intermittent,
    PeakOnly,
}

/// Reference specification of an appliance type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub key: String,
    pub display_name: String,
    pub power_watts: f64,
    pub voltage: f64,
    pub typical_hours: f64,
    pub efficiency_class: String,
    /// Alpha used by the thermal correction
    pub thermal_sensitivity: f64,
    pub usage_pattern: UsagePattern,
    pub category: DeviceCategory,
    pub emoji: String,
    /// Conversion efficiency (0-1)
    pub efficiency: f64,
    pub lifespan_years: u32,
}

#[allow(clippy::too_many_arguments)]
fn spec(
    key: &str,
    display_name: &str,
    power_watts: f64,
    typical_hours: f64,
    efficiency_class: &str,
    thermal_sensitivity: f64,
    usage_pattern: UsagePattern,
    category: DeviceCategory,
    emoji: &str,
    efficiency: f64,
    lifespan_years: u32,
) -> DeviceSpec {
    DeviceSpec {
        key: key.to_string(),
        display_name: display_name.to_string(),
        power_watts,
        voltage: 230.0,
        typical_hours,
        efficiency_class: efficiency_class.to_string(),
        thermal_sensitivity,
        usage_pattern,
        category,
        emoji: emoji.to_string(),
        efficiency,
        lifespan_years,
    }
}

static BUILTIN: Lazy<DeviceCatalog> = Lazy::new(|| {
    use DeviceCategory::*;
    use UsagePattern::*;

    DeviceCatalog::from_specs(vec![
        spec("Air Conditioner", "Air Conditioner (1.5HP)", 1200.0, 8.0, "A", 0.05, Continuous, Cooling, "❄️", 0.85, 10),
        spec("Television", "LED TV (55 inch)", 120.0, 6.0, "A+", 0.01, Intermittent, Entertainment, "📺", 0.90, 8),
        spec("Refrigerator", "Refrigerator (300L)", 150.0, 24.0, "A++", 0.04, Continuous, Kitchen, "🧊", 0.88, 12),
        spec("Washing Machine", "Washing Machine (7kg)", 500.0, 1.0, "A++", 0.02, Intermittent, Laundry, "👕", 0.82, 10),
        spec("Microwave", "Microwave Oven", 1200.0, 0.5, "A", 0.01, Intermittent, Kitchen, "🔥", 0.75, 8),
        spec("LED Bulb", "LED Bulb (10W)", 10.0, 6.0, "A++", 0.005, Intermittent, Lighting, "💡", 0.95, 15),
        spec("Ceiling Fan", "Ceiling Fan", 75.0, 12.0, "A+", 0.02, Continuous, Cooling, "🌀", 0.85, 12),
        spec("Water Heater", "Electric Water Heater", 2000.0, 2.0, "B", 0.03, Intermittent, Heating, "🚿", 0.78, 8),
        spec("Electric Kettle", "Electric Kettle", 1500.0, 0.25, "A", 0.01, Intermittent, Kitchen, "☕", 0.85, 5),
        spec("Laptop", "Laptop", 65.0, 8.0, "A", 0.01, Intermittent, Electronics, "💻", 0.88, 5),
        spec("Desktop Computer", "Desktop Computer", 300.0, 8.0, "B", 0.01, Intermittent, Electronics, "🖥️", 0.75, 6),
        spec("Gaming Console", "Gaming Console", 150.0, 4.0, "B", 0.01, Intermittent, Entertainment, "🎮", 0.70, 7),
        spec("Iron", "Clothes Iron", 1000.0, 0.5, "B", 0.01, Intermittent, Laundry, "👔", 0.80, 8),
        spec("Hair Dryer", "Hair Dryer", 1800.0, 0.25, "B", 0.01, Intermittent, Personal, "💇", 0.75, 5),
        spec("Vacuum Cleaner", "Vacuum Cleaner", 1400.0, 0.5, "B", 0.01, Intermittent, Cleaning, "🧹", 0.70, 8),
    ])
});

/// Appliance reference database used to auto-fill device inputs
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    specs: BTreeMap<String, DeviceSpec>,
}

impl DeviceCatalog {
    pub fn from_specs(specs: Vec<DeviceSpec>) -> Self {
        Self {
            specs: specs.into_iter().map(|s| (s.key.clone(), s)).collect(),
        }
    }

    /// The built-in appliance table
    pub fn builtin() -> &'static DeviceCatalog {
        &BUILTIN
    }

    pub fn get(&self, key: &str) -> Option<&DeviceSpec> {
        self.specs.get(key)
    }

    pub fn power_rating(&self, key: &str) -> Option<f64> {
        self.get(key).map(|s| s.power_watts)
    }

    pub fn typical_hours(&self, key: &str) -> Option<f64> {
        self.get(key).map(|s| s.typical_hours)
    }

    pub fn thermal_sensitivity(&self, key: &str) -> f64 {
        self.get(key)
            .map(|s| s.thermal_sensitivity)
            .unwrap_or(DEFAULT_THERMAL_SENSITIVITY)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn specs(&self) -> impl Iterator<Item = &DeviceSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Unique categories present in the catalog
    pub fn categories(&self) -> Vec<DeviceCategory> {
        self.specs
            .values()
            .map(|s| s.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn devices_by_category(&self, category: DeviceCategory) -> Vec<&str> {
        self.specs
            .values()
            .filter(|s| s.category == category)
            .map(|s| s.key.as_str())
            .collect()
    }

    /// Electrical safety check for a planned device mix.
    ///
    /// Unknown keys contribute no power.
    pub fn validate_combination<S: AsRef<str>>(&self, keys: &[S]) -> BTreeMap<String, String> {
        let mut warnings = BTreeMap::new();
        let total_power: f64 = keys
            .iter()
            .filter_map(|k| self.power_rating(k.as_ref()))
            .sum();

        if total_power > HOUSEHOLD_POWER_LIMIT_W {
            warnings.insert(
                "high_power".to_string(),
                format!("Total power {total_power}W may exceed household capacity"),
            );
        }
        warnings
    }
}

/// A device registered in the household
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub device_type: String,
    pub power_watts: f64,
    pub quantity: u32,
    pub hours_per_day: f64,
    pub days_per_month: u32,
    pub category: DeviceCategory,
    pub emoji: String,
    pub efficiency: f64,
    pub voltage: f64,
}

impl Device {
    /// Build a device from a catalog entry, numbered by its position in the household.
    pub fn from_spec(spec: &DeviceSpec, ordinal: usize, quantity: u32, hours_per_day: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("{} #{}", spec.key, ordinal),
            device_type: spec.key.clone(),
            power_watts: spec.power_watts,
            quantity,
            hours_per_day,
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            category: spec.category,
            emoji: spec.emoji.clone(),
            efficiency: spec.efficiency,
            voltage: spec.voltage,
        }
    }

    /// Rated power of all units together
    pub fn rated_power(&self) -> Power {
        Power::watts(self.power_watts * self.quantity as f64)
    }

    /// Unadjusted energy over the device's own billing period
    pub fn monthly_energy(&self) -> Energy {
        self.rated_power()
            .over_hours(self.hours_per_day * self.days_per_month as f64)
    }
}
