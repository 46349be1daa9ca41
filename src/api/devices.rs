use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    domain::Device,
    validation::DeviceInput,
};

/// Request to quick-add a catalog device
#[derive(Debug, Deserialize)]
pub struct AddDeviceRequest {
    device_type: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    hours_per_day: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

/// Request to change a device's daily usage
#[derive(Debug, Deserialize)]
pub struct UpdateDeviceRequest {
    hours_per_day: f64,
}

#[derive(Debug, Serialize)]
pub struct DevicePreview {
    monthly_kwh: f64,
}

/// GET /api/v1/devices - List household devices
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Device>>>, ApiError> {
    let devices = state.household.read().await.devices.clone();
    let total = devices.len();
    Ok(Json(ApiResponse::success(devices).with_count(total)))
}

/// GET /api/v1/devices/:id - Get device by ID
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Device>>, ApiError> {
    let household = state.household.read().await;
    let device = household
        .device(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Device with ID {} not found", id)))?;
    Ok(Json(ApiResponse::success(device)))
}

/// POST /api/v1/devices - Quick-add from the catalog
pub async fn add_device(
    State(state): State<AppState>,
    Json(request): Json<AddDeviceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Device>>), ApiError> {
    let mut household = state.household.write().await;
    let device = household
        .add_from_catalog(
            state.catalog,
            &request.device_type,
            request.quantity,
            request.hours_per_day,
        )?
        .clone();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(device))))
}

/// POST /api/v1/devices/custom - Add a fully specified device
pub async fn add_custom_device(
    State(state): State<AppState>,
    Json(input): Json<DeviceInput>,
) -> Result<(StatusCode, Json<ApiResponse<Device>>), ApiError> {
    let mut household = state.household.write().await;
    let device = household.add_custom(state.catalog, input)?.clone();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(device))))
}

/// POST /api/v1/devices/preview - Monthly estimate for a device before adding it
pub async fn preview_device(
    Json(input): Json<DeviceInput>,
) -> Result<Json<ApiResponse<DevicePreview>>, ApiError> {
    let monthly_kwh = input.preview().map_err(|details| ApiError::ValidationError {
        message: "Invalid device".to_string(),
        details,
    })?;
    Ok(Json(ApiResponse::success(DevicePreview { monthly_kwh })))
}

/// PUT /api/v1/devices/:id - Update hours per day
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeviceRequest>,
) -> Result<Json<ApiResponse<Device>>, ApiError> {
    let mut household = state.household.write().await;
    let device = household.update_hours(id, request.hours_per_day)?.clone();
    tracing::info!(device = %device.name, hours = request.hours_per_day, "device updated");
    Ok(Json(ApiResponse::success(device)))
}

/// DELETE /api/v1/devices/:id - Remove a device
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.household.write().await.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}
