use anyhow::Result;
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::assistant::{EnergyAssistant, HouseholdContext};
use crate::billing::{BillingEngine, BillingError};
use crate::config::Config;
use crate::domain::DeviceCatalog;
use crate::forecast::ForecastEngine;
use crate::household::Household;
use crate::simulation::SimulationSession;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub catalog: &'static DeviceCatalog,
    pub billing: Arc<BillingEngine>,
    pub forecast: Arc<ForecastEngine>,
    pub household: Arc<RwLock<Household>>,
    pub assistant: Arc<EnergyAssistant>,
    pub simulation: Arc<SimulationController>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let assistant = EnergyAssistant::from_config(&cfg.assistant);
        Self::with_assistant(cfg, assistant)
    }

    pub fn with_assistant(cfg: Config, assistant: EnergyAssistant) -> Result<Self> {
        let billing = Arc::new(BillingEngine::default());
        if !billing.catalog().contains(&cfg.household.default_country) {
            anyhow::bail!(
                "default country '{}' has no tariff; choose one of: {}",
                cfg.household.default_country,
                billing.available_countries().join(", ")
            );
        }

        let household = Arc::new(RwLock::new(
            Household::new(
                cfg.household.default_country.clone(),
                cfg.household.default_temperature_c,
            )
            .with_chat_limit(cfg.household.chat_history_limit),
        ));

        let status = assistant.status();
        info!(online = status.online, model = ?status.model, "assistant ready");

        let simulation = Arc::new(SimulationController {
            session: RwLock::new(SimulationSession::new(cfg.simulation.window)),
            household: household.clone(),
            billing: billing.clone(),
        });

        Ok(Self {
            cfg,
            catalog: DeviceCatalog::builtin(),
            billing,
            forecast: Arc::new(ForecastEngine::trained(Utc::now().date_naive())),
            household,
            assistant: Arc::new(assistant),
            simulation,
        })
    }

    /// Snapshot of the household as the assistant sees it
    pub async fn assistant_context(&self) -> Result<HouseholdContext, BillingError> {
        let household = self.household.read().await;
        let tariff = self.billing.tariff(&household.country)?;
        let bill = self.billing.household_bill(
            &household.devices,
            &household.country,
            household.temperature_c,
        )?;
        Ok(HouseholdContext {
            country: household.country.clone(),
            climate: tariff.climate.clone(),
            currency: tariff.currency_symbol.clone(),
            rate_per_kwh: tariff.base_rate,
            temperature_c: household.temperature_c,
            devices: household.devices.clone(),
            monthly_energy: bill.total_energy,
            monthly_bill: bill.total_bill,
        })
    }
}

pub fn spawn_controller_tasks(state: AppState, cfg: Config) {
    let simulation = state.simulation.clone();
    tokio::spawn(async move {
        simulation.run(cfg.simulation.tick()).await;
    });
}

/// Drives the live monitoring session from the current household devices
pub struct SimulationController {
    pub session: RwLock<SimulationSession>,
    household: Arc<RwLock<Household>>,
    billing: Arc<BillingEngine>,
}

impl SimulationController {
    pub async fn run(&self, base_tick: Duration) {
        loop {
            let speed = self.session.read().await.speed();
            tokio::time::sleep(speed.tick_interval(base_tick)).await;
            self.tick().await;
        }
    }

    /// One sample, if the session is running
    pub async fn tick(&self) {
        if !self.session.read().await.is_running() {
            return;
        }

        let (devices, country) = {
            let household = self.household.read().await;
            (household.devices.clone(), household.country.clone())
        };
        let rate = match self.billing.tariff(&country) {
            Ok(tariff) => tariff.base_rate,
            Err(e) => {
                warn!(error = %e, "simulation tick without tariff");
                0.0
            }
        };

        let mut session = self.session.write().await;
        if let Some(point) = session.tick(&devices, rate, Local::now()) {
            debug!(
                power_kw = point.power_kw,
                cost_per_hour = point.cost_per_hour,
                devices = devices.len(),
                "simulation tick"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[tokio::test]
    async fn test_unknown_default_country_is_rejected() {
        let mut cfg = Config::default();
        cfg.household.default_country = "Narnia".to_string();
        assert!(AppState::with_assistant(cfg, EnergyAssistant::offline()).is_err());
    }

    #[tokio::test]
    async fn test_tick_only_when_running() {
        let state = AppState::with_assistant(Config::default(), EnergyAssistant::offline()).unwrap();
        state
            .household
            .write()
            .await
            .add_from_catalog(state.catalog, "Refrigerator", 1, None)
            .unwrap();

        state.simulation.tick().await;
        assert_eq!(state.simulation.session.read().await.points().count(), 0);

        state.simulation.session.write().await.start();
        state.simulation.tick().await;
        let snapshot = state.simulation.session.read().await.snapshot();
        assert_eq!(snapshot.series.len(), 1);
        // Refrigerator 150 W at the Nigerian base rate
        assert!((snapshot.current_power_kw - 0.15).abs() < 1e-9);
        assert!((snapshot.cost_per_hour - 0.15 * 68.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tick_uses_local_wall_clock_hour() {
        let state = AppState::with_assistant(Config::default(), EnergyAssistant::offline()).unwrap();
        state
            .household
            .write()
            .await
            .add_from_catalog(state.catalog, "Television", 1, None)
            .unwrap();
        state.simulation.session.write().await.start();

        let before = Local::now().hour();
        state.simulation.tick().await;
        let after = Local::now().hour();

        let session = state.simulation.session.read().await;
        let point = session.points().last().unwrap();
        assert!(point.hour == before || point.hour == after);
        let expected_kw = 0.12 * crate::simulation::usage_factor(&state.household.read().await.devices[0], point.hour);
        assert!((point.power_kw - expected_kw).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_assistant_context() {
        let state = AppState::with_assistant(Config::default(), EnergyAssistant::offline()).unwrap();
        state
            .household
            .write()
            .await
            .add_from_catalog(state.catalog, "Television", 2, None)
            .unwrap();
        let ctx = state.assistant_context().await.unwrap();
        assert_eq!(ctx.country, "Nigeria");
        assert_eq!(ctx.currency, "₦");
        assert_eq!(ctx.climate.as_deref(), Some("tropical"));
        assert_eq!(ctx.devices.len(), 1);
        assert!(ctx.monthly_bill > 0.0);
    }
}
