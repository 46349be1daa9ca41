use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    billing::{calculate_custom, BillBreakdown, HouseholdBill, SavingsEstimate},
    controller::AppState,
    domain::RegionalTariff,
};

#[derive(Debug, Deserialize)]
pub struct TariffBillRequest {
    energy_kwh: f64,
    country: String,
    peak_share: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SavingsRequest {
    current_kwh: f64,
    reduced_kwh: f64,
    country: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomTariffRequest {
    tariff: RegionalTariff,
    energy_kwh: f64,
    peak_share: Option<f64>,
}

/// GET /api/v1/bill - Monthly bill for the current household
pub async fn household_bill(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HouseholdBill>>, ApiError> {
    let household = state.household.read().await;
    let bill = state.billing.household_bill(
        &household.devices,
        &household.country,
        household.temperature_c,
    )?;
    tracing::debug!(
        country = %bill.country,
        energy_kwh = bill.total_energy,
        total = bill.total_bill,
        "bill computed"
    );
    Ok(Json(ApiResponse::success(bill)))
}

/// POST /api/v1/bill/tariff - Bill for a given consumption under a country's tariff
pub async fn tariff_bill(
    State(state): State<AppState>,
    Json(request): Json<TariffBillRequest>,
) -> Result<Json<ApiResponse<BillBreakdown>>, ApiError> {
    let bill = state
        .billing
        .calculate_bill(request.energy_kwh, &request.country, request.peak_share)?;
    Ok(Json(ApiResponse::success(bill)))
}

/// POST /api/v1/bill/savings - Savings from reducing consumption
pub async fn savings(
    State(state): State<AppState>,
    Json(request): Json<SavingsRequest>,
) -> Result<Json<ApiResponse<SavingsEstimate>>, ApiError> {
    let estimate = state.billing.estimate_savings(
        request.current_kwh,
        request.reduced_kwh,
        &request.country,
    )?;
    Ok(Json(ApiResponse::success(estimate)))
}

/// POST /api/v1/bill/custom - Bill under a caller-supplied tariff
pub async fn custom_tariff_bill(
    Json(request): Json<CustomTariffRequest>,
) -> Result<Json<ApiResponse<BillBreakdown>>, ApiError> {
    let bill = calculate_custom(&request.tariff, request.energy_kwh, request.peak_share)?;
    Ok(Json(ApiResponse::success(bill)))
}
