//! Forecast result structure handed to the rendering layer.

use crate::core::{Series, Variable, YearMonth};
use crate::error::{ForecastError, Result};
use crate::utils::AccuracyMetrics;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// A value on the shared history/forecast axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexedPoint {
    /// 1-based position; forecast points continue after the last historical index.
    pub t: usize,
    /// Calendar month the point falls on.
    pub period: YearMonth,
    pub value: f64,
}

/// Re-index a series as `1..=N`.
pub fn index_history(series: &Series) -> Vec<IndexedPoint> {
    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| IndexedPoint {
            t: i + 1,
            period: p.period,
            value: p.value,
        })
        .collect()
}

/// Historical series, rolled-out forecast and residual spread for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutput {
    pub entity: String,
    pub variable: Variable,
    /// Name of the regressor that produced the forecast.
    pub model: String,
    pub historical: Vec<IndexedPoint>,
    pub forecast: Vec<IndexedPoint>,
    /// Root-mean-square training residual.
    pub sigma: f64,
    /// In-sample accuracy of the fitted regressor.
    pub training: AccuracyMetrics,
}

impl ForecastOutput {
    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.forecast.len()
    }

    /// Forecast values in order.
    pub fn values(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.value).collect()
    }

    /// Symmetric band of `k` residual spreads around every forecast value.
    pub fn band(&self, k: f64) -> (Vec<f64>, Vec<f64>) {
        let half = k.abs() * self.sigma;
        self.forecast
            .iter()
            .map(|p| (p.value - half, p.value + half))
            .unzip()
    }

    /// Band whose half-width matches a two-sided normal coverage `level`.
    ///
    /// The width is constant over the horizon; uncertainty is not grown per step.
    pub fn band_for_level(&self, level: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        Ok(self.band(sigmas_for_level(level)?))
    }
}

/// Multiple of σ that covers `level` of a normal distribution, two-sided.
pub fn sigmas_for_level(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "coverage level must be in (0, 1), got {}",
            level
        )));
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| ForecastError::ComputationError(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + level) / 2.0))
}
