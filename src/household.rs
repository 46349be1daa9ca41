//! Per-household session state: devices, settings and chat history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Device, DeviceCatalog, TariffCatalog};
use crate::validation::DeviceInput;

pub const MIN_QUICK_ADD_QUANTITY: u32 = 1;
pub const MAX_QUICK_ADD_QUANTITY: u32 = 10;
pub const MIN_AMBIENT_C: f64 = 15.0;
pub const MAX_AMBIENT_C: f64 = 40.0;
/// Chat messages kept per household; the oldest are dropped first
pub const DEFAULT_CHAT_HISTORY: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum HouseholdError {
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),
    #[error("Device {0} not found")]
    DeviceNotFound(Uuid),
    #[error("Unknown country: {0}")]
    UnknownCountry(String),
    #[error("Quantity {0} outside 1-10")]
    InvalidQuantity(u32),
    #[error("Hours per day {0} outside 0-24")]
    InvalidHours(f64),
    #[error("Temperature {0}°C outside 15-40°C")]
    InvalidTemperature(f64),
    #[error("Invalid device: {}", .0.join("; "))]
    InvalidDevice(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set when the reply came from the offline responder
    #[serde(default)]
    pub fallback: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            fallback: false,
        }
    }

    pub fn assistant(content: impl Into<String>, fallback: bool) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickStats {
    /// Sum of quantities across devices
    pub total_devices: u32,
    pub device_entries: usize,
    pub country: String,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub devices: Vec<Device>,
    pub country: String,
    pub temperature_c: f64,
    chat_history: VecDeque<ChatMessage>,
    chat_limit: usize,
}

impl Household {
    pub fn new(country: impl Into<String>, temperature_c: f64) -> Self {
        Self {
            devices: Vec::new(),
            country: country.into(),
            temperature_c,
            chat_history: VecDeque::new(),
            chat_limit: DEFAULT_CHAT_HISTORY,
        }
    }

    pub fn with_chat_limit(mut self, limit: usize) -> Self {
        self.chat_limit = limit.max(1);
        self
    }

    /// Quick-add from the catalog. `hours` defaults to the appliance's typical use.
    pub fn add_from_catalog(
        &mut self,
        catalog: &DeviceCatalog,
        device_type: &str,
        quantity: u32,
        hours: Option<f64>,
    ) -> Result<&Device, HouseholdError> {
        let spec = catalog
            .get(device_type)
            .ok_or_else(|| HouseholdError::UnknownDeviceType(device_type.to_string()))?;
        if !(MIN_QUICK_ADD_QUANTITY..=MAX_QUICK_ADD_QUANTITY).contains(&quantity) {
            return Err(HouseholdError::InvalidQuantity(quantity));
        }
        let hours = hours.unwrap_or(spec.typical_hours);
        check_hours(hours)?;

        let device = Device::from_spec(spec, self.devices.len() + 1, quantity, hours);
        info!(device = %device.name, quantity, hours, "device added");
        Ok(self.push_device(device))
    }

    /// Adds a fully specified device after validating it.
    pub fn add_custom(
        &mut self,
        catalog: &DeviceCatalog,
        input: DeviceInput,
    ) -> Result<&Device, HouseholdError> {
        input.check().map_err(HouseholdError::InvalidDevice)?;
        let device = input.into_device(catalog);
        info!(device = %device.name, "custom device added");
        Ok(self.push_device(device))
    }

    fn push_device(&mut self, device: Device) -> &Device {
        let idx = self.devices.len();
        self.devices.push(device);
        &self.devices[idx]
    }

    pub fn update_hours(&mut self, id: Uuid, hours: f64) -> Result<&Device, HouseholdError> {
        check_hours(hours)?;
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(HouseholdError::DeviceNotFound(id))?;
        device.hours_per_day = hours;
        Ok(device)
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Device, HouseholdError> {
        let idx = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or(HouseholdError::DeviceNotFound(id))?;
        let removed = self.devices.remove(idx);
        info!(device = %removed.name, "device removed");
        Ok(removed)
    }

    pub fn device(&self, id: Uuid) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn set_country(&mut self, tariffs: &TariffCatalog, country: &str) -> Result<(), HouseholdError> {
        if !tariffs.contains(country) {
            return Err(HouseholdError::UnknownCountry(country.to_string()));
        }
        self.country = country.to_string();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature_c: f64) -> Result<(), HouseholdError> {
        if !(MIN_AMBIENT_C..=MAX_AMBIENT_C).contains(&temperature_c) {
            return Err(HouseholdError::InvalidTemperature(temperature_c));
        }
        self.temperature_c = temperature_c;
        Ok(())
    }

    pub fn stats(&self) -> QuickStats {
        QuickStats {
            total_devices: self.devices.iter().map(|d| d.quantity).sum(),
            device_entries: self.devices.len(),
            country: self.country.clone(),
            temperature_c: self.temperature_c,
        }
    }

    pub fn push_chat(&mut self, message: ChatMessage) {
        while self.chat_history.len() >= self.chat_limit {
            self.chat_history.pop_front();
        }
        self.chat_history.push_back(message);
    }

    /// Oldest first
    pub fn chat_history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat_history.iter()
    }

    pub fn clear_chat(&mut self) {
        self.chat_history.clear();
    }
}

fn check_hours(hours: f64) -> Result<(), HouseholdError> {
    if !(0.0..=24.0).contains(&hours) {
        return Err(HouseholdError::InvalidHours(hours));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsagePattern;

    fn household() -> Household {
        Household::new("Nigeria", 28.0)
    }

    #[test]
    fn test_add_from_catalog_defaults_hours_and_numbers_names() {
        let catalog = DeviceCatalog::builtin();
        let mut h = household();
        let first = h.add_from_catalog(catalog, "Refrigerator", 1, None).unwrap();
        assert_eq!(first.name, "Refrigerator #1");
        assert_eq!(first.hours_per_day, 24.0);

        let second = h.add_from_catalog(catalog, "LED Bulb", 4, Some(5.5)).unwrap();
        assert_eq!(second.name, "LED Bulb #2");
        assert_eq!(h.stats().total_devices, 5);
        assert_eq!(h.stats().device_entries, 2);
    }

    #[test]
    fn test_add_from_catalog_rejects_bad_input() {
        let catalog = DeviceCatalog::builtin();
        let mut h = household();
        assert_eq!(
            h.add_from_catalog(catalog, "Jetpack", 1, None).unwrap_err(),
            HouseholdError::UnknownDeviceType("Jetpack".to_string())
        );
        assert_eq!(
            h.add_from_catalog(catalog, "Laptop", 11, None).unwrap_err(),
            HouseholdError::InvalidQuantity(11)
        );
        assert_eq!(
            h.add_from_catalog(catalog, "Laptop", 1, Some(25.0)).unwrap_err(),
            HouseholdError::InvalidHours(25.0)
        );
        assert!(h.devices.is_empty());
    }

    #[test]
    fn test_update_and_remove() {
        let catalog = DeviceCatalog::builtin();
        let mut h = household();
        let id = h.add_from_catalog(catalog, "Television", 1, None).unwrap().id;

        assert_eq!(h.update_hours(id, 3.0).unwrap().hours_per_day, 3.0);
        assert!(h.update_hours(id, -1.0).is_err());

        let removed = h.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(h.remove(id).unwrap_err(), HouseholdError::DeviceNotFound(id));
    }

    #[test]
    fn test_add_custom_validates() {
        let catalog = DeviceCatalog::builtin();
        let mut h = household();
        let input = DeviceInput {
            device_type: "Pump".to_string(),
            device_name: "Borehole pump".to_string(),
            power_watts: 750.0,
            voltage: 100.0,
            quantity: 1,
            hours_per_day: 2.0,
            days_per_month: 30,
            room: None,
            usage_pattern: UsagePattern::Intermittent,
            category: None,
        };
        assert!(matches!(
            h.add_custom(catalog, input.clone()),
            Err(HouseholdError::InvalidDevice(_))
        ));

        let ok = DeviceInput { voltage: 230.0, ..input };
        assert_eq!(h.add_custom(catalog, ok).unwrap().name, "Borehole pump");
    }

    #[test]
    fn test_chat_history_drops_oldest_past_limit() {
        let mut h = household().with_chat_limit(4);
        for i in 0..6 {
            h.push_chat(ChatMessage::user(format!("q{i}")));
        }
        let kept: Vec<_> = h.chat_history().map(|m| m.content.as_str()).collect();
        assert_eq!(kept, vec!["q2", "q3", "q4", "q5"]);

        h.clear_chat();
        assert_eq!(h.chat_history().count(), 0);
    }

    #[test]
    fn test_settings() {
        let tariffs = TariffCatalog::builtin();
        let mut h = household();
        h.set_country(tariffs, "Kenya").unwrap();
        assert_eq!(h.country, "Kenya");
        assert!(h.set_country(tariffs, "Mordor").is_err());

        h.set_temperature(35.0).unwrap();
        assert_eq!(
            h.set_temperature(45.0).unwrap_err(),
            HouseholdError::InvalidTemperature(45.0)
        );
        assert_eq!(h.temperature_c, 35.0);
    }
}
