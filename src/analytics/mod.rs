//! Household KPIs and saving recommendations

pub mod recommendations;

pub use recommendations::{recommendations, UsageBand};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::billing::HouseholdBill;
use crate::domain::{Device, DeviceCategory, Percentage};
use crate::forecast::{MONTH_NAMES, SEASONAL_FACTORS};

/// Grid emission factor, kg CO₂ per kWh
pub const CO2_KG_PER_KWH: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceShare {
    pub name: String,
    pub energy_kwh: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyProjection {
    pub month: String,
    pub bill: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseholdAnalytics {
    pub monthly_energy: f64,
    pub monthly_bill: f64,
    pub currency: String,
    /// Mean device efficiency, in percent
    pub average_efficiency: f64,
    pub co2_kg: f64,
    /// Largest consumers first
    pub energy_by_device: Vec<DeviceShare>,
    pub energy_by_category: BTreeMap<DeviceCategory, f64>,
    pub yearly_projection: Vec<MonthlyProjection>,
    pub projected_yearly_bill: f64,
}

pub fn co2_footprint(energy_kwh: f64) -> f64 {
    energy_kwh * CO2_KG_PER_KWH
}

/// Summarizes a computed bill. Per-device energy uses each device's own
/// days per month and no thermal adjustment.
pub fn analyze(devices: &[Device], bill: &HouseholdBill) -> HouseholdAnalytics {
    let average_efficiency = Percentage::of(
        devices.iter().map(|d| d.efficiency).sum::<f64>(),
        devices.len() as f64,
    )
    .as_percent();

    let device_total: f64 = devices.iter().map(|d| d.monthly_energy().as_kilowatt_hours()).sum();
    let energy_by_device = devices
        .iter()
        .map(|d| {
            let energy_kwh = d.monthly_energy().as_kilowatt_hours();
            DeviceShare {
                name: d.name.clone(),
                energy_kwh,
                percent: Percentage::of(energy_kwh, device_total).as_percent(),
            }
        })
        .sorted_by(|a, b| b.energy_kwh.total_cmp(&a.energy_kwh))
        .collect();

    let mut energy_by_category = BTreeMap::new();
    for d in devices {
        *energy_by_category.entry(d.category).or_insert(0.0) += d.monthly_energy().as_kilowatt_hours();
    }

    let yearly_projection: Vec<MonthlyProjection> = MONTH_NAMES
        .iter()
        .zip(SEASONAL_FACTORS)
        .map(|(month, factor)| MonthlyProjection {
            month: month.to_string(),
            bill: bill.total_bill * factor,
        })
        .collect();
    let projected_yearly_bill = yearly_projection.iter().map(|m| m.bill).sum();

    HouseholdAnalytics {
        monthly_energy: bill.total_energy,
        monthly_bill: bill.total_bill,
        currency: bill.currency.clone(),
        average_efficiency,
        co2_kg: co2_footprint(bill.total_energy),
        energy_by_device,
        energy_by_category,
        yearly_projection,
        projected_yearly_bill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillingEngine;
    use crate::domain::DeviceCatalog;

    fn devices() -> Vec<Device> {
        let catalog = DeviceCatalog::builtin();
        vec![
            Device::from_spec(catalog.get("LED Bulb").unwrap(), 1, 5, 6.0),
            Device::from_spec(catalog.get("Air Conditioner").unwrap(), 2, 1, 8.0),
            Device::from_spec(catalog.get("Ceiling Fan").unwrap(), 3, 2, 12.0),
        ]
    }

    #[test]
    fn test_analytics() {
        let devices = devices();
        let bill = BillingEngine::default()
            .household_bill(&devices, "Ghana", 28.0)
            .unwrap();
        let a = analyze(&devices, &bill);

        assert_eq!(a.monthly_energy, bill.total_energy);
        assert!((a.co2_kg - bill.total_energy * 0.85).abs() < 1e-9);
        assert_eq!(a.energy_by_device[0].name, "Air Conditioner #2");
        let percent: f64 = a.energy_by_device.iter().map(|d| d.percent).sum();
        assert!((percent - 100.0).abs() < 1e-9);

        // AC 288 kWh + fan 54 kWh
        assert!((a.energy_by_category[&DeviceCategory::Cooling] - 342.0).abs() < 1e-9);
        assert_eq!(a.yearly_projection.len(), 12);
        assert_eq!(a.yearly_projection[6].month, "Jul");
        assert!((a.yearly_projection[6].bill - bill.total_bill * 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_household() {
        let bill = BillingEngine::default().household_bill(&[], "Ghana", 28.0).unwrap();
        let a = analyze(&[], &bill);
        assert_eq!(a.average_efficiency, 0.0);
        assert!(a.energy_by_device.is_empty());
        assert!(a.energy_by_category.is_empty());
    }
}
