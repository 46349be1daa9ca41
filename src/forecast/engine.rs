use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, warn};

use super::correction::{default_corrector, ForecastCorrector, ForecastFeatures, IdentityCorrector};
use super::history::synthetic_history;
use super::seasonal::season_label;
use super::trend::{trend_forecast, MonthForecast, Trend};
use super::ForecastError;
use crate::billing::BillingEngine;
use crate::domain::Device;

/// Months of synthetic history fed to the trend model
pub const HISTORY_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// From the width of the confidence band relative to the forecast
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.2 {
            ConfidenceLevel::High
        } else if ratio < 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub predicted_energy: f64,
    /// Trend forecast before correction
    pub base_energy: f64,
    /// `predicted_energy / base_energy`; 1.0 when uncorrected
    pub correction_factor: f64,
    pub predicted_bill: f64,
    pub currency_symbol: String,
    pub confidence_level: ConfidenceLevel,
    pub confidence_interval: (f64, f64),
    pub trend: Trend,
    pub seasonality_factor: f64,
    pub explanation: String,
    pub monthly: Vec<MonthForecast>,
}

/// Inputs for one household forecast
#[derive(Debug, Clone, Copy)]
pub struct ForecastRequest<'a> {
    pub current_energy: f64,
    pub devices: &'a [Device],
    pub country: &'a str,
    pub temperature_c: f64,
    pub months_ahead: u32,
    pub today: NaiveDate,
}

pub struct ForecastEngine {
    corrector: Box<dyn ForecastCorrector>,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(Box::new(IdentityCorrector))
    }
}

impl ForecastEngine {
    pub fn new(corrector: Box<dyn ForecastCorrector>) -> Self {
        Self { corrector }
    }

    /// Engine with the default corrector fitted on synthetic history ending
    /// at `today`. Falls back to uncorrected forecasts if training fails.
    pub fn trained(today: NaiveDate) -> Self {
        match default_corrector(today) {
            Ok(corrector) => Self::new(corrector),
            Err(e) => {
                warn!(error = %e, "forecast corrector unavailable, using trend only");
                Self::default()
            }
        }
    }

    pub fn is_corrected(&self) -> bool {
        self.corrector.is_trained()
    }

    /// Next-month forecast for the household, billed for its country.
    pub fn comprehensive_forecast(
        &self,
        billing: &BillingEngine,
        req: ForecastRequest<'_>,
    ) -> Result<ForecastResult, ForecastError> {
        let history = synthetic_history(req.current_energy, HISTORY_MONTHS, req.today)?;
        let trend = trend_forecast(&history, req.months_ahead.max(1))?;
        let primary = trend.forecasts.first().ok_or(ForecastError::EmptyForecast)?;

        let features = household_features(req.devices, req.temperature_c);
        let corrected = self.corrector.correct(primary.predicted_energy, &features);

        let band = primary.confidence_upper - primary.confidence_lower;
        let confidence_level = if corrected > 0.0 {
            ConfidenceLevel::from_ratio(band / corrected)
        } else {
            ConfidenceLevel::Low
        };

        let correction_factor = if primary.predicted_energy > 0.0 {
            corrected / primary.predicted_energy
        } else {
            1.0
        };

        let bill = billing.calculate_bill(corrected, req.country, None)?;
        let mut explanation = format!(
            "Forecast shows {} trend. Next month is {} (×{:.2} seasonal factor).",
            trend.trend.to_string().to_lowercase(),
            season_label(primary.seasonal_factor),
            primary.seasonal_factor
        );
        if self.is_corrected() {
            explanation.push_str(&format!(
                " Adjusted ×{correction_factor:.2} by the correction model."
            ));
        }
        debug!(
            base = primary.predicted_energy,
            corrected,
            trend = %trend.trend,
            "forecast computed"
        );

        Ok(ForecastResult {
            predicted_energy: corrected,
            base_energy: primary.predicted_energy,
            correction_factor,
            predicted_bill: bill.total_bill,
            currency_symbol: bill.currency_symbol,
            confidence_level,
            confidence_interval: (primary.confidence_lower, primary.confidence_upper),
            trend: trend.trend,
            seasonality_factor: primary.seasonal_factor,
            explanation,
            monthly: trend.forecasts.clone(),
        })
    }
}

fn household_features(devices: &[Device], temperature_c: f64) -> ForecastFeatures {
    let defaults = ForecastFeatures::default();
    let usage_hours = if devices.is_empty() {
        defaults.usage_hours
    } else {
        devices.iter().map(|d| d.hours_per_day).sum::<f64>() / devices.len() as f64
    };
    ForecastFeatures {
        temperature_c,
        humidity: defaults.humidity,
        device_count: devices.len() as f64,
        total_power_w: devices.iter().map(|d| d.power_watts).sum(),
        usage_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillingError;
    use crate::domain::DeviceCatalog;
    use crate::forecast::{MAX_CORRECTION, MIN_CORRECTION};
    #[cfg(feature = "ml")]
    use crate::forecast::correction::TrainingExample;
    #[cfg(feature = "ml")]
    use crate::forecast::ForestCorrector;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn devices() -> Vec<Device> {
        let catalog = DeviceCatalog::builtin();
        vec![Device::from_spec(catalog.get("Air Conditioner").unwrap(), 1, 1, 8.0)]
    }

    fn request<'a>(devices: &'a [Device], country: &'a str, months_ahead: u32) -> ForecastRequest<'a> {
        ForecastRequest {
            current_energy: 300.0,
            devices,
            country,
            temperature_c: 28.0,
            months_ahead,
            today: today(),
        }
    }

    #[test]
    fn test_forecast_is_billed_and_explained() {
        let engine = ForecastEngine::default();
        let billing = BillingEngine::default();
        let devices = devices();
        let result = engine
            .comprehensive_forecast(&billing, request(&devices, "Nigeria", 3))
            .unwrap();

        assert_eq!(result.monthly.len(), 3);
        assert_eq!(result.monthly[0].date, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        // ±15% band against an uncorrected forecast
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(result.currency_symbol, "₦");
        let expected_bill = billing
            .calculate_bill(result.predicted_energy, "Nigeria", None)
            .unwrap()
            .total_bill;
        assert!((result.predicted_bill - expected_bill).abs() < 1e-9);
        assert!(result.explanation.starts_with("Forecast shows "));
        assert!(result.explanation.contains("seasonal factor"));
    }

    #[test]
    fn test_unknown_country() {
        let devices = devices();
        let err = ForecastEngine::default()
            .comprehensive_forecast(&BillingEngine::default(), request(&devices, "Atlantis", 1))
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::Billing(BillingError::UnknownCountry("Atlantis".to_string()))
        );
    }

    #[cfg(feature = "ml")]
    #[test]
    fn test_trained_corrector_is_applied() {
        let examples: Vec<_> = (0..10)
            .map(|i| {
                let f = i as f64;
                TrainingExample {
                    base_forecast: 280.0 + f,
                    actual_energy: (280.0 + f) * 1.5,
                    features: ForecastFeatures {
                        temperature_c: 20.0 + f,
                        humidity: 40.0 + f,
                        device_count: 1.0 + f,
                        total_power_w: 1000.0 + 100.0 * f,
                        usage_hours: 4.0 + f,
                    },
                }
            })
            .collect();
        let billing = BillingEngine::default();
        let devices = devices();
        let plain = ForecastEngine::default()
            .comprehensive_forecast(&billing, request(&devices, "Kenya", 1))
            .unwrap();
        assert_eq!(plain.correction_factor, 1.0);
        assert!(!plain.explanation.contains("correction model"));

        let engine = ForecastEngine::new(Box::new(ForestCorrector::train(&examples).unwrap()));
        assert!(engine.is_corrected());
        let corrected = engine
            .comprehensive_forecast(&billing, request(&devices, "Kenya", 1))
            .unwrap();
        assert!((corrected.predicted_energy - plain.predicted_energy * 1.5).abs() < 1e-6);
        assert!((corrected.correction_factor - 1.5).abs() < 1e-6);
        assert_eq!(corrected.base_energy, plain.base_energy);
        assert!(corrected.explanation.ends_with("Adjusted ×1.50 by the correction model."));
    }

    #[test]
    fn test_trained_engine_matches_feature_set() {
        let engine = ForecastEngine::trained(today());
        assert_eq!(engine.is_corrected(), cfg!(feature = "ml"));
        let devices = devices();
        let result = engine
            .comprehensive_forecast(&BillingEngine::default(), request(&devices, "Ghana", 2))
            .unwrap();
        let factor = result.predicted_energy / result.base_energy;
        assert!((factor - result.correction_factor).abs() < 1e-9);
        assert!((MIN_CORRECTION..=MAX_CORRECTION).contains(&result.correction_factor));
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_ratio(0.1), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_ratio(0.3), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_ratio(0.4), ConfidenceLevel::Low);
    }
}
