use serde::Serialize;

use super::context::HouseholdContext;

pub const ANALYSIS_SYSTEM: &str = "You are an expert energy consultant specializing in African energy markets.
Provide detailed, actionable analysis covering:

1. ENERGY EFFICIENCY ASSESSMENT
2. COST OPTIMIZATION STRATEGIES
3. SEASONAL PLANNING ADVICE
4. DEVICE UPGRADE RECOMMENDATIONS
5. BEHAVIORAL CHANGE SUGGESTIONS
6. RENEWABLE ENERGY OPPORTUNITIES
7. LOAD MANAGEMENT STRATEGIES
8. CARBON FOOTPRINT REDUCTION

Be specific, practical, and consider African energy challenges like grid instability, high costs, and climate factors.
Provide numerical estimates where possible.";

pub const PREDICTION_SYSTEM: &str =
    "You are an energy forecasting AI. Provide accurate predictions in JSON format.";

pub const OPTIMIZATION_SYSTEM: &str =
    "You are an energy optimization expert. Provide actionable, specific recommendations.";

pub const ANOMALY_SYSTEM: &str = "You are an energy anomaly detection specialist.";

const DEFAULT_QUERY: &str = "Provide comprehensive energy analysis and recommendations";

pub fn analysis_prompt(ctx: &HouseholdContext, query: Option<&str>) -> String {
    let climate = ctx
        .climate
        .as_deref()
        .map(|c| format!(" ({c} climate)"))
        .unwrap_or_default();
    let query = query.filter(|q| !q.trim().is_empty()).unwrap_or(DEFAULT_QUERY);

    format!(
        "ENERGY CONSUMPTION ANALYSIS REQUEST

Location: {country}{climate}
Currency: {currency}
Electricity Rate: {rate} {currency}/kWh
Temperature: {temperature}°C

HOUSEHOLD DEVICES ({count} total):
{devices}

Total Power Capacity: {power}W

USER QUERY: {query}",
        country = ctx.country,
        currency = ctx.currency,
        rate = ctx.rate_per_kwh,
        temperature = ctx.temperature_c,
        count = ctx.devices.len(),
        devices = ctx.device_lines().join("\n"),
        power = ctx.total_power_w(),
    )
}

pub fn prediction_prompt(ctx: &HouseholdContext, months: u32) -> String {
    format!(
        "ENERGY FORECASTING REQUEST

Current monthly consumption: {energy:.1} kWh
Location: {country}
Devices: {count} total
Forecast period: {months} months

Provide month-by-month predictions considering:
- Seasonal variations in {country}
- Device aging and efficiency degradation
- Typical usage pattern changes
- Economic factors affecting consumption

Return predictions as JSON format:
{{\"predictions\": [{{\"month\": 1, \"energy_kwh\": 450, \"confidence\": 0.85, \"factors\": [\"seasonal_increase\"]}}, ...]}}",
        energy = ctx.raw_monthly_energy(),
        country = ctx.country,
        count = ctx.devices.len(),
    )
}

#[derive(Serialize)]
struct DeviceUsage<'a> {
    name: &'a str,
    power: f64,
    hours: f64,
    quantity: u32,
}

pub fn optimization_prompt(ctx: &HouseholdContext, target_reduction: f64) -> Result<String, serde_json::Error> {
    let usage: Vec<DeviceUsage<'_>> = ctx
        .devices
        .iter()
        .map(|d| DeviceUsage {
            name: &d.name,
            power: d.power_watts,
            hours: d.hours_per_day,
            quantity: d.quantity,
        })
        .collect();

    Ok(format!(
        "ENERGY OPTIMIZATION REQUEST

Target: Reduce consumption by {target_reduction}%
Country: {country}

Current devices and usage:
{devices}

Provide specific optimization strategies with:
1. Device-specific recommendations
2. Usage pattern changes
3. Technology upgrades
4. Behavioral modifications
5. Expected savings for each recommendation",
        country = ctx.country,
        devices = serde_json::to_string_pretty(&usage)?,
    ))
}

pub fn anomaly_prompt(consumption_data: &serde_json::Value) -> Result<String, serde_json::Error> {
    Ok(format!(
        "ENERGY ANOMALY DETECTION

Consumption data: {data}

Analyze for:
1. Unusual consumption spikes
2. Efficiency degradation patterns
3. Seasonal anomalies
4. Device malfunction indicators
5. Billing discrepancies

Provide explanations and corrective actions.",
        data = serde_json::to_string(consumption_data)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::context::fixtures::context;

    #[test]
    fn test_analysis_prompt() {
        let prompt = analysis_prompt(&context(), None);
        assert!(prompt.contains("Location: Nigeria (tropical climate)"));
        assert!(prompt.contains("Electricity Rate: 68 ₦/kWh"));
        assert!(prompt.contains("HOUSEHOLD DEVICES (2 total):"));
        assert!(prompt.contains("Total Power Capacity: 1240W"));
        assert!(prompt.ends_with("USER QUERY: Provide comprehensive energy analysis and recommendations"));

        let asked = analysis_prompt(&context(), Some("Why is my bill high?"));
        assert!(asked.ends_with("USER QUERY: Why is my bill high?"));
    }

    #[test]
    fn test_prediction_prompt_asks_for_json() {
        let prompt = prediction_prompt(&context(), 12);
        assert!(prompt.contains("Current monthly consumption: 295.2 kWh"));
        assert!(prompt.contains("Forecast period: 12 months"));
        assert!(prompt.contains(r#"{"predictions": [{"month": 1"#));
    }

    #[test]
    fn test_optimization_prompt_lists_devices() {
        let prompt = optimization_prompt(&context(), 20.0).unwrap();
        assert!(prompt.contains("Reduce consumption by 20%"));
        assert!(prompt.contains(r#""name": "LED Bulb #2""#));
    }

    #[test]
    fn test_anomaly_prompt_embeds_data() {
        let data = serde_json::json!({"monthly_kwh": [300, 310, 900]});
        let prompt = anomaly_prompt(&data).unwrap();
        assert!(prompt.contains(r#"Consumption data: {"monthly_kwh":[300,310,900]}"#));
    }
}
