//! Energy and thermal model
//!
//! Monthly device energy follows `E = P × h × d × n / 1000` (kWh). Ambient
//! temperature corrections are applied relative to a 22 °C reference:
//! `E(T) = E_base × [1 + α (T − T_ref) / T_ref]`, never dropping below 10% of
//! the base energy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Device, DeviceCategory, Temperature};

/// Reference temperature (°C)
pub const T_REF: f64 = 22.0;
const REFERENCE: Temperature = Temperature(T_REF);

/// Coefficient used by the dashboard's household bill
pub const HOUSEHOLD_ALPHA: f64 = 0.03;

/// Lowest realistic ambient temperature accepted (°C)
pub const MIN_TEMPERATURE_C: f64 = -50.0;
/// Highest realistic ambient temperature accepted (°C)
pub const MAX_TEMPERATURE_C: f64 = 60.0;

const MIN_CORRECTION_FACTOR: f64 = 0.1;
const HUMIDITY_THRESHOLD: f64 = 60.0;
const HUMIDITY_COEFF: f64 = 0.001;

#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("All parameters must be positive")]
    NonPositiveInput,
    #[error("Temperature {0}°C outside realistic range (-50°C to 60°C)")]
    TemperatureOutOfRange(f64),
}

/// Fundamental energy equation, result in kWh.
pub fn device_energy(power_w: f64, hours: f64, days: u32, quantity: u32) -> Result<f64, PhysicsError> {
    if power_w <= 0.0 || hours < 0.0 || days == 0 || quantity == 0 {
        return Err(PhysicsError::NonPositiveInput);
    }
    Ok(power_w * hours * days as f64 * quantity as f64 / 1000.0)
}

/// Same equation without input checks, used for display figures.
pub fn raw_energy_kwh(power_w: f64, hours: f64, days: u32, quantity: u32) -> f64 {
    power_w * hours * days as f64 * quantity as f64 / 1000.0
}

/// Temperature-corrected energy for a device with sensitivity `alpha`.
pub fn thermal_correction(energy_kwh: f64, temperature_c: f64, alpha: f64) -> Result<f64, PhysicsError> {
    if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&temperature_c) {
        return Err(PhysicsError::TemperatureOutOfRange(temperature_c));
    }
    let deviation = Temperature::celsius(temperature_c).relative_to(REFERENCE);
    let factor = (1.0 + alpha * deviation).max(MIN_CORRECTION_FACTOR);
    Ok(energy_kwh * factor)
}

/// The simple adjustment applied to household bills.
///
/// Uses a fixed 0.03 coefficient and no range check.
pub fn household_adjusted(energy_kwh: f64, temperature_c: f64) -> f64 {
    energy_kwh * (1.0 + HOUSEHOLD_ALPHA * Temperature::celsius(temperature_c).relative_to(REFERENCE))
}

/// Thermal coefficient per category. Heating is inversely related to
/// temperature; its magnitude is what the correction uses.
pub fn category_alpha(category: DeviceCategory) -> f64 {
    match category {
        DeviceCategory::Cooling => 0.05,
        DeviceCategory::Heating => -0.04,
        DeviceCategory::Kitchen => 0.02,
        DeviceCategory::Electronics => 0.01,
        DeviceCategory::Lighting => 0.005,
        _ => 0.03,
    }
}

/// Temperature correction with an extra humidity penalty for cooling loads.
pub fn advanced_thermal(
    energy_kwh: f64,
    temperature_c: f64,
    humidity_percent: f64,
    category: DeviceCategory,
) -> Result<f64, PhysicsError> {
    let alpha = category_alpha(category).abs();
    let mut corrected = thermal_correction(energy_kwh, temperature_c, alpha)?;

    if category == DeviceCategory::Cooling && humidity_percent > HUMIDITY_THRESHOLD {
        corrected *= 1.0 + HUMIDITY_COEFF * (humidity_percent - HUMIDITY_THRESHOLD);
    }
    Ok(corrected)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceEnergy {
    pub name: String,
    pub base_energy: f64,
    pub corrected_energy: f64,
    pub temperature_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EnergyBreakdown {
    pub devices: Vec<DeviceEnergy>,
    pub total_base_energy: f64,
    pub total_corrected_energy: f64,
    pub temperature_impact: f64,
}

/// Total household energy with every environmental correction applied.
pub fn total_energy(
    devices: &[Device],
    temperature_c: f64,
    humidity_percent: f64,
) -> Result<EnergyBreakdown, PhysicsError> {
    let mut out = EnergyBreakdown::default();

    for device in devices {
        let base = device_energy(
            device.power_watts,
            device.hours_per_day,
            device.days_per_month,
            device.quantity,
        )?;
        let corrected = advanced_thermal(base, temperature_c, humidity_percent, device.category)?;

        out.devices.push(DeviceEnergy {
            name: device.name.clone(),
            base_energy: base,
            corrected_energy: corrected,
            temperature_impact: corrected - base,
        });
        out.total_base_energy += base;
        out.total_corrected_energy += corrected;
    }
    out.temperature_impact = out.total_corrected_energy - out.total_base_energy;
    Ok(out)
}
