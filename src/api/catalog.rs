use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::{DeviceCategory, DeviceSpec, RegionalTariff},
};

#[derive(Debug, Serialize)]
pub struct CountrySummary {
    name: String,
    currency: String,
    currency_symbol: String,
    tariff_kind: String,
    base_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryGroup {
    category: DeviceCategory,
    devices: Vec<String>,
}

/// GET /api/v1/countries - Supported countries with their tariff kind
pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CountrySummary>>>, ApiError> {
    let countries: Vec<CountrySummary> = state
        .billing
        .catalog()
        .tariffs()
        .map(|t| CountrySummary {
            name: t.country.clone(),
            currency: t.currency.clone(),
            currency_symbol: t.currency_symbol.clone(),
            tariff_kind: t.kind().to_string(),
            base_rate: t.base_rate,
        })
        .collect();

    let total = countries.len();
    Ok(Json(ApiResponse::success(countries).with_count(total)))
}

/// GET /api/v1/countries/:name - Full tariff definition
pub async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RegionalTariff>>, ApiError> {
    let tariff = state
        .billing
        .catalog()
        .get(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Country {} not found", name)))?;
    Ok(Json(ApiResponse::success(tariff)))
}

/// GET /api/v1/catalog - Reference appliance specifications
pub async fn list_catalog(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeviceSpec>>>, ApiError> {
    let specs: Vec<DeviceSpec> = state.catalog.specs().cloned().collect();
    let total = specs.len();
    Ok(Json(ApiResponse::success(specs).with_count(total)))
}

/// GET /api/v1/catalog/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryGroup>>>, ApiError> {
    let groups: Vec<CategoryGroup> = state
        .catalog
        .categories()
        .into_iter()
        .map(|category| CategoryGroup {
            category,
            devices: state
                .catalog
                .devices_by_category(category)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();
    Ok(Json(ApiResponse::success(groups)))
}

