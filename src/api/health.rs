use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::controller::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    billing: ComponentHealth,
    assistant: ComponentHealth,
    simulation: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn up(detail: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            detail: Some(detail.into()),
            error: None,
        }
    }

    fn down(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            detail: None,
            error: Some(error.into()),
        }
    }
}

impl HealthChecks {
    fn overall(&self) -> HealthStatus {
        let all = [&self.billing, &self.assistant, &self.simulation];
        if all.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// GET /healthz - Liveness probe
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /health - Component health
///
/// An offline assistant is reported but keeps the service healthy, since
/// chat falls back to canned replies.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let country = state.household.read().await.country.clone();
    let billing = match state.billing.tariff(&country) {
        Ok(tariff) => ComponentHealth::up(tariff.country.clone()),
        Err(e) => ComponentHealth::down(e.to_string()),
    };

    let assistant = ComponentHealth::up(if state.assistant.is_online() {
        "online"
    } else {
        "offline"
    });

    let running = state.simulation.session.read().await.is_running();
    let simulation = ComponentHealth::up(if running { "running" } else { "stopped" });

    let checks = HealthChecks {
        billing,
        assistant,
        simulation,
    };
    let status = checks.overall();
    tracing::debug!(?status, "health check completed");

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        code,
        Json(HealthResponse {
            status,
            timestamp: Utc::now(),
            checks,
        }),
    )
}
