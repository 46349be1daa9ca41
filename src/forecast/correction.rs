//! Post-processing of the trend forecast from household features
//!
//! With the `ml` feature the correction is a smartcore random forest that
//! predicts the actual/forecast ratio from standardized features. Without it
//! forecasts pass through unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "ml")]
use smartcore::api::{Transformer, UnsupervisedEstimator};
#[cfg(feature = "ml")]
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
#[cfg(feature = "ml")]
use smartcore::linalg::basic::matrix::DenseMatrix;
#[cfg(feature = "ml")]
use smartcore::preprocessing::numerical::{StandardScaler, StandardScalerParameters};
#[cfg(feature = "ml")]
use tracing::warn;

use super::ForecastError;

pub const MIN_TRAINING_EXAMPLES: usize = 10;
pub const MIN_CORRECTION: f64 = 0.5;
pub const MAX_CORRECTION: f64 = 2.0;

pub const FEATURE_NAMES: [&str; 6] = [
    "base_forecast",
    "temperature",
    "humidity",
    "device_count",
    "total_power",
    "usage_hours",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastFeatures {
    pub temperature_c: f64,
    pub humidity: f64,
    pub device_count: f64,
    pub total_power_w: f64,
    pub usage_hours: f64,
}

impl Default for ForecastFeatures {
    fn default() -> Self {
        Self {
            temperature_c: 25.0,
            humidity: 50.0,
            device_count: 5.0,
            total_power_w: 3000.0,
            usage_hours: 8.0,
        }
    }
}

impl ForecastFeatures {
    /// Model input row, in `FEATURE_NAMES` order
    pub fn row(&self, base_forecast: f64) -> [f64; 6] {
        [
            base_forecast,
            self.temperature_c,
            self.humidity,
            self.device_count,
            self.total_power_w,
            self.usage_hours,
        ]
    }
}

/// An observed month: what the trend model said and what was actually used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrainingExample {
    pub base_forecast: f64,
    pub actual_energy: f64,
    pub features: ForecastFeatures,
}

impl TrainingExample {
    pub fn ratio(&self) -> f64 {
        self.actual_energy / self.base_forecast
    }
}

pub trait ForecastCorrector: Send + Sync {
    fn correct(&self, base_forecast: f64, features: &ForecastFeatures) -> f64;

    fn is_trained(&self) -> bool {
        false
    }
}

/// Leaves the forecast unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCorrector;

impl ForecastCorrector for IdentityCorrector {
    fn correct(&self, base_forecast: f64, _features: &ForecastFeatures) -> f64 {
        base_forecast
    }
}

/// Examples usable for training: positive forecast, finite actual.
pub fn usable_examples(examples: &[TrainingExample]) -> Result<Vec<TrainingExample>, ForecastError> {
    let usable: Vec<_> = examples
        .iter()
        .filter(|e| e.base_forecast > 0.0 && e.actual_energy.is_finite())
        .copied()
        .collect();
    if usable.len() < MIN_TRAINING_EXAMPLES {
        return Err(ForecastError::InsufficientTraining {
            required: MIN_TRAINING_EXAMPLES,
            actual: usable.len(),
        });
    }
    Ok(usable)
}

/// Random forest over standardized features, predicting the
/// actual/forecast ratio. Predictions are clamped to [0.5, 2.0].
#[cfg(feature = "ml")]
pub struct ForestCorrector {
    scaler: StandardScaler<f64>,
    model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
    pub training_samples: usize,
}

#[cfg(feature = "ml")]
impl ForestCorrector {
    /// 100 trees, seed 42
    pub fn default_parameters() -> RandomForestRegressorParameters {
        RandomForestRegressorParameters {
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            n_trees: 100,
            m: None,
            keep_samples: false,
            seed: 42,
        }
    }

    pub fn train(examples: &[TrainingExample]) -> Result<Self, ForecastError> {
        Self::train_with(examples, Self::default_parameters())
    }

    pub fn train_with(
        examples: &[TrainingExample],
        params: RandomForestRegressorParameters,
    ) -> Result<Self, ForecastError> {
        let usable = usable_examples(examples)?;

        // A column with zero spread cannot be standardized
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let first = usable[0].features.row(usable[0].base_forecast)[i];
            if usable
                .iter()
                .all(|e| e.features.row(e.base_forecast)[i] == first)
            {
                return Err(ForecastError::ConstantFeature(name));
            }
        }

        let flat: Vec<f64> = usable
            .iter()
            .flat_map(|e| e.features.row(e.base_forecast))
            .collect();
        let x = DenseMatrix::new(usable.len(), FEATURE_NAMES.len(), flat, false);
        let y: Vec<f64> = usable.iter().map(TrainingExample::ratio).collect();

        let scaler = StandardScaler::fit(&x, StandardScalerParameters::default())
            .map_err(|e| ForecastError::Model(format!("{e:?}")))?;
        let x_scaled = scaler
            .transform(&x)
            .map_err(|e| ForecastError::Model(format!("{e:?}")))?;
        let model = RandomForestRegressor::fit(&x_scaled, &y, params)
            .map_err(|e| ForecastError::Model(format!("{e:?}")))?;

        info!(examples = usable.len(), "forecast corrector trained");
        Ok(Self {
            scaler,
            model,
            training_samples: usable.len(),
        })
    }

    /// Predicted actual/forecast ratio before clamping
    pub fn raw_factor(&self, base_forecast: f64, features: &ForecastFeatures) -> Result<f64, ForecastError> {
        let x = DenseMatrix::new(1, FEATURE_NAMES.len(), features.row(base_forecast).to_vec(), false);
        let x_scaled = self
            .scaler
            .transform(&x)
            .map_err(|e| ForecastError::Model(format!("{e:?}")))?;
        let predictions = self
            .model
            .predict(&x_scaled)
            .map_err(|e| ForecastError::Model(format!("{e:?}")))?;
        predictions
            .first()
            .copied()
            .filter(|f| f.is_finite())
            .ok_or_else(|| ForecastError::Model("model returned no prediction".to_string()))
    }
}

#[cfg(feature = "ml")]
impl ForecastCorrector for ForestCorrector {
    fn correct(&self, base_forecast: f64, features: &ForecastFeatures) -> f64 {
        match self.raw_factor(base_forecast, features) {
            Ok(factor) => base_forecast * factor.clamp(MIN_CORRECTION, MAX_CORRECTION),
            Err(e) => {
                warn!(error = %e, "forecast correction skipped");
                base_forecast
            }
        }
    }

    fn is_trained(&self) -> bool {
        true
    }
}

/// Corrector fitted on the synthetic household training set ending at `today`.
#[cfg(feature = "ml")]
pub fn default_corrector(today: NaiveDate) -> Result<Box<dyn ForecastCorrector>, ForecastError> {
    let examples = super::training::synthetic_training_set(today)?;
    Ok(Box::new(ForestCorrector::train(&examples)?))
}

#[cfg(not(feature = "ml"))]
pub fn default_corrector(_today: NaiveDate) -> Result<Box<dyn ForecastCorrector>, ForecastError> {
    info!("built without the ml feature, forecasts are not corrected");
    Ok(Box::new(IdentityCorrector))
}
