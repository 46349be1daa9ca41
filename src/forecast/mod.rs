//! Monthly consumption forecasting
//!
//! Synthetic history, a linear-trend model with month-of-year seasonality and a
//! correction layer trained on backtested synthetic households, combined by
//! [`ForecastEngine`].

pub mod correction;
pub mod engine;
pub mod history;
pub mod seasonal;
pub mod training;
pub mod trend;

pub use correction::*;
pub use engine::*;
pub use history::*;
pub use seasonal::*;
pub use training::*;
pub use trend::*;

use thiserror::Error;

use crate::billing::BillingError;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("Need at least {required} months of historical data, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },
    #[error("Need at least {required} training examples, got {actual}")]
    InsufficientTraining { required: usize, actual: usize },
    #[error("Baseline energy must be a non-negative number, got {0}")]
    InvalidBaseline(f64),
    #[error("Forecast date out of range")]
    DateOutOfRange,
    #[error("Noise distribution: {0}")]
    Distribution(String),
    #[error("Feature '{0}' does not vary across the training examples")]
    ConstantFeature(&'static str),
    #[error("Correction model: {0}")]
    Model(String),
    #[error("Forecast produced no months")]
    EmptyForecast,
    #[error(transparent)]
    Billing(#[from] BillingError),
}
