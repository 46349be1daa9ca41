pub mod engine;
pub mod household;

pub use engine::*;
pub use household::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BillingError {
    #[error("Billing configuration not available for {0}")]
    UnknownCountry(String),
    #[error("Energy consumption cannot be negative: {0}")]
    NegativeEnergy(f64),
    #[error("Peak share must be between 0 and 1, got {0}")]
    InvalidPeakShare(f64),
    #[error("Invalid tariff: {}", .0.join("; "))]
    InvalidTariff(Vec<String>),
}
