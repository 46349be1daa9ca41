use serde::{Deserialize, Serialize};

use crate::domain::Device;
use crate::physics::raw_energy_kwh;

/// Days used when describing device consumption to the model
const PROMPT_DAYS: u32 = 30;

/// Everything the assistant knows about the household when answering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdContext {
    pub country: String,
    pub climate: Option<String>,
    pub currency: String,
    pub rate_per_kwh: f64,
    pub temperature_c: f64,
    pub devices: Vec<Device>,
    pub monthly_energy: f64,
    pub monthly_bill: f64,
}

impl HouseholdContext {
    pub fn total_power_w(&self) -> f64 {
        self.devices.iter().map(|d| d.rated_power().as_watts()).sum()
    }

    /// Raw 30-day consumption with no thermal adjustment
    pub fn raw_monthly_energy(&self) -> f64 {
        self.devices
            .iter()
            .map(|d| raw_energy_kwh(d.power_watts, d.hours_per_day, PROMPT_DAYS, d.quantity))
            .sum()
    }

    pub fn device_lines(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| {
                let energy = raw_energy_kwh(d.power_watts, d.hours_per_day, PROMPT_DAYS, d.quantity);
                format!(
                    "- {}: {}W × {} = {:.1} kWh/month",
                    d.name, d.power_watts, d.quantity, energy
                )
            })
            .collect()
    }
}
