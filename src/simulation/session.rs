use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use strum::{Display, EnumString};

use super::usage::{usage_factor, DeviceStatus};
use crate::domain::{Device, Power};

pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
pub enum SimulationSpeed {
    #[default]
    #[serde(rename = "1x")]
    #[strum(serialize = "1x")]
    X1,
    #[serde(rename = "2x")]
    #[strum(serialize = "2x")]
    X2,
    #[serde(rename = "5x")]
    #[strum(serialize = "5x")]
    X5,
}

impl SimulationSpeed {
    pub fn multiplier(&self) -> u32 {
        match self {
            SimulationSpeed::X1 => 1,
            SimulationSpeed::X2 => 2,
            SimulationSpeed::X5 => 5,
        }
    }

    /// Wall-clock interval between ticks at this speed
    pub fn tick_interval(&self, base: Duration) -> Duration {
        base / self.multiplier()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationPoint {
    pub time: DateTime<Utc>,
    /// Wall-clock hour the usage windows were evaluated at
    pub hour: u32,
    pub power_kw: f64,
    pub cost_per_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveDeviceStatus {
    pub name: String,
    pub emoji: String,
    pub power_w: f64,
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSnapshot {
    pub running: bool,
    pub speed: SimulationSpeed,
    pub current_power_kw: f64,
    pub cost_per_hour: f64,
    pub daily_projection: f64,
    pub devices: Vec<LiveDeviceStatus>,
    pub series: Vec<SimulationPoint>,
}

/// Live monitoring session; keeps a sliding window of the most recent points.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    running: bool,
    speed: SimulationSpeed,
    window: usize,
    points: VecDeque<SimulationPoint>,
    last_devices: Vec<LiveDeviceStatus>,
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SimulationSession {
    pub fn new(window: usize) -> Self {
        Self {
            running: false,
            speed: SimulationSpeed::default(),
            window: window.max(1),
            points: VecDeque::with_capacity(window.max(1)),
            last_devices: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> SimulationSpeed {
        self.speed
    }

    /// Starts a fresh run, discarding earlier points.
    pub fn start(&mut self) {
        self.running = true;
        self.points.clear();
        self.last_devices.clear();
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.points.clear();
        self.last_devices.clear();
    }

    pub fn set_speed(&mut self, speed: SimulationSpeed) {
        self.speed = speed;
    }

    pub fn points(&self) -> impl Iterator<Item = &SimulationPoint> {
        self.points.iter()
    }

    /// Samples every device at `now` and appends a point. Does nothing while paused.
    ///
    /// Usage windows follow the hour in `now`'s own timezone; the stored time is UTC.
    pub fn tick<Tz: TimeZone>(
        &mut self,
        devices: &[Device],
        rate_per_kwh: f64,
        now: DateTime<Tz>,
    ) -> Option<&SimulationPoint> {
        if !self.running {
            return None;
        }
        let hour = now.hour();

        self.last_devices = devices
            .iter()
            .map(|d| {
                let factor = usage_factor(d, hour);
                LiveDeviceStatus {
                    name: d.name.clone(),
                    emoji: d.emoji.clone(),
                    power_w: (d.rated_power() * factor).as_watts(),
                    status: DeviceStatus::from_factor(factor),
                }
            })
            .collect();

        let total = self
            .last_devices
            .iter()
            .map(|s| Power::watts(s.power_w))
            .sum::<Power>()
            .as_kilowatts();

        if self.points.len() == self.window {
            self.points.pop_front();
        }
        self.points.push_back(SimulationPoint {
            time: now.with_timezone(&Utc),
            hour,
            power_kw: total,
            cost_per_hour: total * rate_per_kwh,
        });
        self.points.back()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let (current_power_kw, cost_per_hour) = self
            .points
            .back()
            .map(|p| (p.power_kw, p.cost_per_hour))
            .unwrap_or((0.0, 0.0));

        SimulationSnapshot {
            running: self.running,
            speed: self.speed,
            current_power_kw,
            cost_per_hour,
            daily_projection: cost_per_hour * 24.0,
            devices: self.last_devices.clone(),
            series: self.points.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceCatalog;
    use chrono::FixedOffset;
    use std::str::FromStr;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn devices() -> Vec<Device> {
        let catalog = DeviceCatalog::builtin();
        vec![
            Device::from_spec(catalog.get("Air Conditioner").unwrap(), 1, 1, 8.0),
            Device::from_spec(catalog.get("Refrigerator").unwrap(), 2, 1, 24.0),
        ]
    }

    #[test]
    fn test_tick_ignored_while_stopped() {
        let mut session = SimulationSession::default();
        assert!(session.tick(&devices(), 68.0, at_hour(14)).is_none());
        assert_eq!(session.points().count(), 0);
    }

    #[test]
    fn test_tick_computes_power_and_cost() {
        let mut session = SimulationSession::default();
        session.start();
        let point = session.tick(&devices(), 68.0, at_hour(14)).unwrap().clone();
        // AC 1200 * 0.8 + fridge 150 * 1.0
        assert!((point.power_kw - 1.11).abs() < 1e-9);
        assert!((point.cost_per_hour - 1.11 * 68.0).abs() < 1e-9);

        let snap = session.snapshot();
        assert!(snap.running);
        assert_eq!(snap.devices.len(), 2);
        assert_eq!(snap.devices[0].status, DeviceStatus::On);
        assert!((snap.daily_projection - 1.11 * 68.0 * 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_usage_follows_local_hour() {
        // 18:00 in Lagos is 17:00 UTC, inside the TV's evening window only locally
        let lagos = FixedOffset::east_opt(3600).unwrap();
        let now = lagos.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        let catalog = DeviceCatalog::builtin();
        let tv = vec![Device::from_spec(catalog.get("Television").unwrap(), 1, 1, 5.0)];

        let mut session = SimulationSession::default();
        session.start();
        let point = session.tick(&tv, 1.0, now).unwrap().clone();
        assert_eq!(point.hour, 18);
        assert_eq!(point.time, at_hour(17));
        // 120 W at the 0.8 peak factor
        assert!((point.power_kw - 0.096).abs() < 1e-9);
    }

    #[test]
    fn test_window_keeps_last_points() {
        let mut session = SimulationSession::new(20);
        session.start();
        for i in 0..25 {
            session.tick(&devices(), 1.0, at_hour(i % 24));
        }
        let series: Vec<_> = session.points().collect();
        assert_eq!(series.len(), 20);
        assert_eq!(series[0].time, at_hour(5));
    }

    #[test]
    fn test_pause_reset_and_restart() {
        let mut session = SimulationSession::default();
        session.start();
        session.tick(&devices(), 1.0, at_hour(1));
        session.pause();
        assert!(!session.is_running());
        assert_eq!(session.points().count(), 1);

        session.start();
        assert_eq!(session.points().count(), 0);

        session.tick(&devices(), 1.0, at_hour(2));
        session.reset();
        assert!(!session.is_running());
        assert_eq!(session.snapshot().series.len(), 0);
    }

    #[test]
    fn test_speed() {
        assert_eq!(SimulationSpeed::from_str("5x").unwrap(), SimulationSpeed::X5);
        assert_eq!(SimulationSpeed::X2.to_string(), "2x");
        assert_eq!(
            SimulationSpeed::X2.tick_interval(Duration::from_secs(2)),
            Duration::from_secs(1)
        );
        let json = serde_json::to_string(&SimulationSpeed::X5).unwrap();
        assert_eq!(json, "\"5x\"");
    }
}
