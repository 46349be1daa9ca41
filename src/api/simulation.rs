use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    controller::AppState,
    simulation::{SimulationSnapshot, SimulationSpeed},
};

#[derive(Debug, Deserialize)]
pub struct SpeedRequest {
    speed: SimulationSpeed,
}

/// GET /api/v1/simulation - Live monitoring snapshot
pub async fn get_simulation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let snapshot = state.simulation.session.read().await.snapshot();
    Ok(Json(ApiResponse::success(snapshot)))
}

/// POST /api/v1/simulation/start - Begin a fresh run
pub async fn start(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    if state.household.read().await.devices.is_empty() {
        return Err(ApiError::BadRequest(
            "Add devices before starting the simulation".to_string(),
        ));
    }
    let mut session = state.simulation.session.write().await;
    session.start();
    tracing::info!(speed = %session.speed(), "simulation started");
    Ok(Json(ApiResponse::success(session.snapshot())))
}

/// POST /api/v1/simulation/pause
pub async fn pause(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.simulation.session.write().await;
    session.pause();
    Ok(Json(ApiResponse::success(session.snapshot())))
}

/// POST /api/v1/simulation/reset
pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.simulation.session.write().await;
    session.reset();
    Ok(Json(ApiResponse::success(session.snapshot())))
}

/// POST /api/v1/simulation/step - Take one sample now
pub async fn step(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    state.simulation.tick().await;
    let snapshot = state.simulation.session.read().await.snapshot();
    Ok(Json(ApiResponse::success(snapshot)))
}

/// PUT /api/v1/simulation/speed
pub async fn set_speed(
    State(state): State<AppState>,
    Json(request): Json<SpeedRequest>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.simulation.session.write().await;
    session.set_speed(request.speed);
    Ok(Json(ApiResponse::success(session.snapshot())))
}
