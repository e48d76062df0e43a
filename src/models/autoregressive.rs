//! Autoregressive rollout of a fitted regressor.
//!
//! Each step feeds the trailing window (observed values first, then earlier
//! predictions) back into the regressor. Steps depend on each other, so the
//! rollout is strictly sequential.

use crate::core::{index_history, ForecastOutput, IndexedPoint, Series};
use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use crate::transform::{TrainingSet, DEFAULT_WINDOW};
use crate::utils::{root_mean_square, AccuracyMetrics, CancellationToken};
use tracing::{debug, trace};

/// Default number of months forecast by one rollout.
pub const DEFAULT_HORIZON: usize = 60;

/// Root-mean-square of `target - predicted` over the training examples.
///
/// A single global spread; it is not widened with the forecast step.
pub fn residual_spread(targets: &[f64], predicted: &[f64]) -> Result<f64> {
    if targets.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: targets.len(),
            got: predicted.len(),
        });
    }
    if targets.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }

    let residuals: Vec<f64> = targets.iter().zip(predicted).map(|(y, p)| y - p).collect();
    Ok(root_mean_square(&residuals))
}

/// Rolls a fitted regressor forward over a fixed horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoregressiveForecaster {
    window: usize,
    horizon: usize,
}

impl AutoregressiveForecaster {
    pub fn new(window: usize, horizon: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "window must be at least 1".into(),
            ));
        }
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".into(),
            ));
        }
        Ok(Self { window, horizon })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Predict `horizon` values starting from the last `window` entries of `recent`.
    ///
    /// Cancellation is checked before every step.
    pub fn rollout(
        &self,
        regressor: &dyn Regressor,
        recent: &[f64],
        cancel: &CancellationToken,
    ) -> Result<Vec<f64>> {
        if recent.len() < self.window {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: recent.len(),
            });
        }

        let mut buffer = recent[recent.len() - self.window..].to_vec();
        let mut predictions = Vec::with_capacity(self.horizon);

        for step in 1..=self.horizon {
            cancel.check()?;
            let next = regressor.predict(&buffer)?;
            if !next.is_finite() {
                return Err(ForecastError::TrainingDiverged {
                    epoch: step,
                    loss: next,
                });
            }
            trace!(step, value = next, "rollout step");

            predictions.push(next);
            buffer.rotate_left(1);
            if let Some(last) = buffer.last_mut() {
                *last = next;
            }
        }

        Ok(predictions)
    }

    /// Assemble the historical series, rolled-out forecast and residual spread.
    ///
    /// `regressor` must already be fitted on `training`, which was framed from `series`.
    pub fn forecast(
        &self,
        series: &Series,
        training: &TrainingSet,
        regressor: &dyn Regressor,
        cancel: &CancellationToken,
    ) -> Result<ForecastOutput> {
        if training.window() != self.window {
            return Err(ForecastError::DimensionMismatch {
                expected: self.window,
                got: training.window(),
            });
        }
        let fitted = regressor.fitted_values().ok_or(ForecastError::FitRequired)?;
        let targets = training.targets();
        let sigma = residual_spread(&targets, fitted)?;
        let metrics = AccuracyMetrics::evaluate(&targets, fitted)?;

        let values = series.values();
        let predictions = self.rollout(regressor, &values, cancel)?;

        let historical = index_history(series);
        let last_t = historical.len();
        let mut period = series.last_period().ok_or(ForecastError::EmptyData)?;
        let forecast = predictions
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                period = period.succ();
                IndexedPoint {
                    t: last_t + i + 1,
                    period,
                    value,
                }
            })
            .collect();

        debug!(
            entity = series.entity(),
            horizon = self.horizon,
            sigma,
            "forecast rolled out"
        );

        Ok(ForecastOutput {
            entity: series.entity().to_string(),
            variable: series.variable(),
            model: regressor.name().to_string(),
            historical,
            forecast,
            sigma,
            training: metrics,
        })
    }
}

impl Default for AutoregressiveForecaster {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
        }
    }
}
