//! Physics-aware validation of user-supplied device inputs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::{Device, DeviceCatalog, DeviceCategory, UsagePattern};
use crate::physics::raw_energy_kwh;

/// Mains voltages accepted for a device
pub const STANDARD_VOLTAGES: [f64; 5] = [110.0, 120.0, 220.0, 230.0, 240.0];

/// Monthly consumption above which an input is treated as a typo
pub const MAX_REALISTIC_MONTHLY_KWH: f64 = 2000.0;

pub const MAX_POWER_W: f64 = 10000.0;

fn default_voltage() -> f64 {
    230.0
}

fn default_days() -> u32 {
    30
}

fn default_pattern() -> UsagePattern {
    UsagePattern::Intermittent
}

fn validate_power(watts: f64) -> Result<(), ValidationError> {
    if watts > 0.0 && watts <= MAX_POWER_W {
        return Ok(());
    }
    let mut err = ValidationError::new("power_range");
    err.message = Some(format!("Power {watts}W outside realistic range (1-10000W)").into());
    Err(err)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceInput {
    #[validate(length(min = 1, max = 64, message = "Device type is required"))]
    pub device_type: String,
    #[validate(length(min = 1, max = 64, message = "Device name is required"))]
    pub device_name: String,
    #[validate(custom(function = "validate_power"))]
    pub power_watts: f64,
    #[serde(default = "default_voltage")]
    pub voltage: f64,
    #[validate(range(min = 1, max = 20, message = "Quantity must be between 1 and 20"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, max = 24.0, message = "Hours per day must be between 0 and 24"))]
    pub hours_per_day: f64,
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 31, message = "Days per month must be between 1 and 31"))]
    pub days_per_month: u32,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default = "default_pattern")]
    pub usage_pattern: UsagePattern,
    #[serde(default)]
    pub category: Option<DeviceCategory>,
}

impl DeviceInput {
    pub fn monthly_kwh(&self) -> f64 {
        raw_energy_kwh(self.power_watts, self.hours_per_day, self.days_per_month, self.quantity)
    }

    /// Runs every check and reports all failures, field checks first.
    pub fn check(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(field_errors) = self.validate() {
            let mut fields: Vec<_> = field_errors.field_errors().into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            for (field, errs) in fields {
                for err in errs {
                    errors.push(
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field)),
                    );
                }
            }
        }

        if !STANDARD_VOLTAGES.contains(&self.voltage) {
            errors.push(format!(
                "Voltage {}V not standard (110/120/220/230/240V)",
                self.voltage
            ));
        }

        let monthly = self.monthly_kwh();
        if monthly > MAX_REALISTIC_MONTHLY_KWH {
            errors.push(format!("Monthly consumption {monthly:.1} kWh seems unrealistic"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Estimated monthly consumption, only for inputs that pass validation.
    pub fn preview(&self) -> Result<f64, Vec<String>> {
        self.check().map(|_| self.monthly_kwh())
    }

    /// Converts a validated input into a household device, borrowing
    /// category, emoji and efficiency from the catalog when the type is known.
    pub fn into_device(self, catalog: &DeviceCatalog) -> Device {
        let spec = catalog.get(&self.device_type);
        Device {
            id: Uuid::new_v4(),
            name: self.device_name,
            category: self
                .category
                .or_else(|| spec.map(|s| s.category))
                .unwrap_or(DeviceCategory::General),
            emoji: spec.map(|s| s.emoji.clone()).unwrap_or_else(|| "🔌".to_string()),
            efficiency: spec.map(|s| s.efficiency).unwrap_or(0.85),
            device_type: self.device_type,
            power_watts: self.power_watts,
            quantity: self.quantity,
            hours_per_day: self.hours_per_day,
            days_per_month: self.days_per_month,
            voltage: self.voltage,
        }
    }
}
