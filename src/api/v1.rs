use axum::{
    routing::{get, post, put},
    Router,
};

use crate::controller::AppState;

use super::{assistant, billing, catalog, devices, health, insights, settings, simulation};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/health", get(health::health_check))
        .route("/countries", get(catalog::list_countries))
        .route("/countries/:name", get(catalog::get_country))
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/categories", get(catalog::list_categories))
        .route("/devices", get(devices::list_devices).post(devices::add_device))
        .route("/devices/custom", post(devices::add_custom_device))
        .route("/devices/preview", post(devices::preview_device))
        .route(
            "/devices/:id",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/stats", get(settings::get_stats))
        .route("/bill", get(billing::household_bill))
        .route("/bill/tariff", post(billing::tariff_bill))
        .route("/bill/savings", post(billing::savings))
        .route("/bill/custom", post(billing::custom_tariff_bill))
        .route("/analytics", get(insights::get_analytics))
        .route("/recommendations", get(insights::get_recommendations))
        .route("/forecast", get(insights::get_forecast))
        .route("/energy", get(insights::get_energy_breakdown))
        .route("/simulation", get(simulation::get_simulation))
        .route("/simulation/start", post(simulation::start))
        .route("/simulation/pause", post(simulation::pause))
        .route("/simulation/reset", post(simulation::reset))
        .route("/simulation/step", post(simulation::step))
        .route("/simulation/speed", put(simulation::set_speed))
        .route("/assistant/status", get(assistant::status))
        .route("/assistant/suggestions", get(assistant::suggestions))
        .route("/assistant/chat", post(assistant::chat))
        .route(
            "/assistant/history",
            get(assistant::history).delete(assistant::clear_history),
        )
        .route("/assistant/analysis", post(assistant::analysis))
        .route("/assistant/predict", post(assistant::predict))
        .route("/assistant/optimize", post(assistant::optimize))
        .route("/assistant/anomalies", post(assistant::anomalies))
        .with_state(state)
}
