use chrono::{Datelike, Months, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

use super::history::HistoryPoint;
use super::seasonal::seasonal_factor;
use super::ForecastError;

pub const MIN_HISTORY_MONTHS: usize = 6;

/// Slopes below this (kWh/month) count as flat
pub const STABLE_SLOPE: f64 = 0.5;

/// Relative half-width of the confidence band
pub const CONFIDENCE_BAND: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < STABLE_SLOPE {
            Trend::Stable
        } else if slope > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthForecast {
    /// Months after the last observation, starting at 1
    pub offset: u32,
    pub date: NaiveDate,
    pub predicted_energy: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub seasonal_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendForecast {
    pub forecasts: Vec<MonthForecast>,
    pub trend: Trend,
    pub slope: f64,
    pub seasonal_strength: f64,
}

/// Least-squares slope of `values` against their index.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Linear trend plus month-of-year seasonality over the history.
pub fn trend_forecast(
    history: &[HistoryPoint],
    months_ahead: u32,
) -> Result<TrendForecast, ForecastError> {
    if history.len() < MIN_HISTORY_MONTHS {
        return Err(ForecastError::InsufficientHistory {
            required: MIN_HISTORY_MONTHS,
            actual: history.len(),
        });
    }

    let values: Vec<f64> = history.iter().map(|p| p.energy_kwh).collect();
    let slope = linear_slope(&values);
    let overall_mean = values.iter().sum::<f64>() / values.len() as f64;

    let monthly_means: BTreeMap<u32, f64> = history
        .iter()
        .map(|p| (p.month, p.energy_kwh))
        .into_group_map()
        .into_iter()
        .map(|(month, v)| (month, v.iter().sum::<f64>() / v.len() as f64))
        .collect();

    let (last_date, last_value) = history
        .iter()
        .max_by_key(|p| p.date)
        .map(|p| (p.date, p.energy_kwh))
        .ok_or(ForecastError::InsufficientHistory {
            required: MIN_HISTORY_MONTHS,
            actual: 0,
        })?;

    let mut forecasts = Vec::with_capacity(months_ahead as usize);
    for offset in 1..=months_ahead {
        let date = last_date
            .checked_add_months(Months::new(offset))
            .ok_or(ForecastError::DateOutOfRange)?;
        let month = date.month();

        let adjustment = match monthly_means.get(&month) {
            Some(mean) if overall_mean > 0.0 => mean / overall_mean,
            _ => seasonal_factor(month),
        };
        let predicted = (last_value + slope * offset as f64) * adjustment;

        forecasts.push(MonthForecast {
            offset,
            date,
            predicted_energy: predicted,
            confidence_lower: predicted * (1.0 - CONFIDENCE_BAND),
            confidence_upper: predicted * (1.0 + CONFIDENCE_BAND),
            seasonal_factor: adjustment,
        });
    }

    let seasonal_strength = if overall_mean > 0.0 {
        population_std(monthly_means.values().copied()) / overall_mean
    } else {
        0.0
    };

    Ok(TrendForecast {
        forecasts,
        trend: Trend::from_slope(slope),
        slope,
        seasonal_strength,
    })
}

fn population_std(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    (values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
}
