use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{analyze, recommendations, HouseholdAnalytics, UsageBand},
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    forecast::{ForecastRequest, ForecastResult},
    physics::{total_energy, EnergyBreakdown},
};

pub const DEFAULT_FORECAST_MONTHS: u32 = 3;
pub const MAX_FORECAST_MONTHS: u32 = 12;
pub const DEFAULT_HUMIDITY: f64 = 50.0;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    months: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EnergyQuery {
    humidity: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    monthly_energy: f64,
    band: UsageBand,
    recommendations: Vec<String>,
}

/// GET /api/v1/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HouseholdAnalytics>>, ApiError> {
    let household = state.household.read().await;
    let bill = state.billing.household_bill(
        &household.devices,
        &household.country,
        household.temperature_c,
    )?;
    Ok(Json(ApiResponse::success(analyze(&household.devices, &bill))))
}

/// GET /api/v1/recommendations - Tips for the household's usage band and season
pub async fn get_recommendations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RecommendationsResponse>>, ApiError> {
    let household = state.household.read().await;
    let bill = state.billing.household_bill(
        &household.devices,
        &household.country,
        household.temperature_c,
    )?;
    let tips = recommendations(bill.total_energy, Utc::now().month());
    let total = tips.len();
    Ok(Json(
        ApiResponse::success(RecommendationsResponse {
            monthly_energy: bill.total_energy,
            band: UsageBand::from_energy(bill.total_energy),
            recommendations: tips,
        })
        .with_count(total),
    ))
}

/// GET /api/v1/forecast?months=3
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ApiResponse<ForecastResult>>, ApiError> {
    let months = query.months.unwrap_or(DEFAULT_FORECAST_MONTHS);
    if !(1..=MAX_FORECAST_MONTHS).contains(&months) {
        return Err(ApiError::validation(format!(
            "months must be between 1 and {MAX_FORECAST_MONTHS}"
        )));
    }

    let household = state.household.read().await;
    let bill = state.billing.household_bill(
        &household.devices,
        &household.country,
        household.temperature_c,
    )?;
    let forecast = state.forecast.comprehensive_forecast(
        &state.billing,
        ForecastRequest {
            current_energy: bill.total_energy,
            devices: &household.devices,
            country: &household.country,
            temperature_c: household.temperature_c,
            months_ahead: months,
            today: Utc::now().date_naive(),
        },
    )?;
    Ok(Json(ApiResponse::success(forecast)))
}

/// GET /api/v1/energy?humidity=50 - Per-device energy with temperature and humidity corrections
pub async fn get_energy_breakdown(
    State(state): State<AppState>,
    Query(query): Query<EnergyQuery>,
) -> Result<Json<ApiResponse<EnergyBreakdown>>, ApiError> {
    let humidity = query.humidity.unwrap_or(DEFAULT_HUMIDITY);
    if !(0.0..=100.0).contains(&humidity) {
        return Err(ApiError::validation("humidity must be between 0 and 100"));
    }
    let household = state.household.read().await;
    let breakdown = total_energy(&household.devices, household.temperature_c, humidity)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(Json(ApiResponse::success(breakdown)))
}
