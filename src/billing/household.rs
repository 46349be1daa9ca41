use serde::{Deserialize, Serialize};

use super::{BillingEngine, BillingError};
use crate::domain::Device;
use crate::physics::{household_adjusted, raw_energy_kwh};

/// Days billed for every household device
pub const BILLING_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceCost {
    pub id: uuid::Uuid,
    pub name: String,
    pub energy: f64,
    pub cost: f64,
}

/// Monthly household bill as shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseholdBill {
    pub country: String,
    pub currency: String,
    pub temperature_c: f64,
    pub total_energy: f64,
    pub energy_cost: f64,
    pub fixed_charge: f64,
    pub tax: f64,
    pub total_bill: f64,
    pub daily_cost: f64,
    pub yearly_cost: f64,
    pub device_breakdown: Vec<DeviceCost>,
}

impl BillingEngine {
    /// Bills the household's devices for a 30-day month at the country's base
    /// rate, with every device's energy adjusted for ambient temperature.
    pub fn household_bill(
        &self,
        devices: &[Device],
        country: &str,
        temperature_c: f64,
    ) -> Result<HouseholdBill, BillingError> {
        let tariff = self.tariff(country)?;

        let device_breakdown: Vec<DeviceCost> = devices
            .iter()
            .map(|d| {
                let base = raw_energy_kwh(d.power_watts, d.hours_per_day, BILLING_DAYS, d.quantity);
                let energy = household_adjusted(base, temperature_c);
                DeviceCost {
                    id: d.id,
                    name: d.name.clone(),
                    energy,
                    cost: energy * tariff.base_rate,
                }
            })
            .collect();

        let total_energy: f64 = device_breakdown.iter().map(|d| d.energy).sum();
        let energy_cost = total_energy * tariff.base_rate;
        let subtotal = energy_cost + tariff.fixed_charge;
        let tax = subtotal * tariff.tax_rate;
        let total_bill = subtotal + tax;

        Ok(HouseholdBill {
            country: tariff.country.clone(),
            currency: tariff.currency_symbol.clone(),
            temperature_c,
            total_energy,
            energy_cost,
            fixed_charge: tariff.fixed_charge,
            tax,
            total_bill,
            daily_cost: total_bill / BILLING_DAYS as f64,
            yearly_cost: total_bill * 12.0,
            device_breakdown,
        })
    }
}
