use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    household::{HouseholdError, QuickStats, MAX_AMBIENT_C, MIN_AMBIENT_C},
};

/// Partial settings update; absent fields are left alone
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    country: Option<String>,
    temperature_c: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Settings {
    country: String,
    temperature_c: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    stats: QuickStats,
    warnings: BTreeMap<String, String>,
}

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let household = state.household.read().await;
    Ok(Json(ApiResponse::success(Settings {
        country: household.country.clone(),
        temperature_c: household.temperature_c,
    })))
}

/// PUT /api/v1/settings - Change country and/or ambient temperature
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let mut household = state.household.write().await;
    // Validate both before applying either
    if let Some(t) = request.temperature_c {
        if !(MIN_AMBIENT_C..=MAX_AMBIENT_C).contains(&t) {
            return Err(HouseholdError::InvalidTemperature(t).into());
        }
    }
    if let Some(country) = request.country.as_deref() {
        household.set_country(state.billing.catalog(), country)?;
    }
    if let Some(t) = request.temperature_c {
        household.set_temperature(t)?;
    }

    tracing::info!(country = %household.country, temperature_c = household.temperature_c, "settings updated");
    Ok(Json(ApiResponse::success(Settings {
        country: household.country.clone(),
        temperature_c: household.temperature_c,
    })))
}

/// GET /api/v1/stats - Quick stats plus electrical warnings
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let household = state.household.read().await;
    // One key per unit so the power check sees every appliance
    let keys: Vec<&str> = household
        .devices
        .iter()
        .flat_map(|d| std::iter::repeat(d.device_type.as_str()).take(d.quantity as usize))
        .collect();

    Ok(Json(ApiResponse::success(StatsResponse {
        stats: household.stats(),
        warnings: state.catalog.validate_combination(&keys),
    })))
}
