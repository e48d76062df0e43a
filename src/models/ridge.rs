//! Closed-form ridge regression over the lag window.
//!
//! A linear alternative to the MLP: `y = intercept + Σ coef_k * x_k`, solved
//! from the regularized normal equations with a Cholesky decomposition. The
//! intercept is not penalized.

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use crate::transform::{Standardizer, TrainingSet};
use crate::utils::{all_finite, CancellationToken};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hyperparameters for [`RidgeRegressor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    /// L2 penalty on the lag coefficients (standardized units).
    pub lambda: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self { lambda: 1e-3 }
    }
}

impl RidgeConfig {
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "ridge lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Ridge regressor over standardized lag windows.
#[derive(Debug, Clone, Default)]
pub struct RidgeRegressor {
    config: RidgeConfig,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
    scaler: Standardizer,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl RidgeRegressor {
    pub fn new(config: RidgeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Lag coefficients in standardized units, oldest lag first.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn predict_with(&self, coefficients: &[f64], input: &[f64]) -> f64 {
        let z: f64 = self.intercept
            + coefficients
                .iter()
                .zip(input)
                .map(|(c, &x)| c * self.scaler.transform_value(x))
                .sum::<f64>();
        self.scaler.inverse_value(z)
    }
}

impl Regressor for RidgeRegressor {
    fn fit(&mut self, training: &TrainingSet, cancel: &CancellationToken) -> Result<()> {
        self.config.validate()?;
        cancel.check()?;
        if training.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let k = training.window();
        let num_params = k + 1;
        let scaler = Standardizer::fit(&training.observed_values());

        // intercept in column 0
        let mut equations = NormalEquations::new(num_params);
        let mut row = vec![1.0; num_params];
        for example in training.examples() {
            for (slot, &x) in row[1..].iter_mut().zip(&example.input) {
                *slot = scaler.transform_value(x);
            }
            equations.add_row(&row, scaler.transform_value(example.target));
        }

        equations.add_to_diagonal(0, 1e-8);
        for i in 1..num_params {
            equations.add_to_diagonal(i, self.config.lambda + 1e-8);
        }

        if !equations.is_finite() {
            return Err(ForecastError::TrainingDiverged {
                epoch: 1,
                loss: f64::NAN,
            });
        }

        let beta = equations.solve().ok_or_else(|| {
            ForecastError::ComputationError(
                "ridge regression failed: matrix not positive definite".into(),
            )
        })?;

        self.scaler = scaler;
        self.intercept = beta[0];
        let coefficients = beta[1..].to_vec();

        let fitted: Vec<f64> = training
            .inputs()
            .map(|x| self.predict_with(&coefficients, x))
            .collect();
        if !all_finite(&fitted) {
            return Err(ForecastError::TrainingDiverged {
                epoch: 1,
                loss: f64::NAN,
            });
        }
        let residuals = training
            .targets()
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        debug!(examples = training.len(), lambda = self.config.lambda, "ridge fitted");

        self.coefficients = Some(coefficients);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, input: &[f64]) -> Result<f64> {
        let coefficients = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        if input.len() != coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: coefficients.len(),
                got: input.len(),
            });
        }
        Ok(self.predict_with(coefficients, input))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Ridge"
    }
}

/// Accumulated `X'X` and `X'y` for a design with `dim` columns.
#[derive(Debug, Clone)]
struct NormalEquations {
    dim: usize,
    /// dim x dim, row-major
    gram: Vec<f64>,
    moment: Vec<f64>,
}

impl NormalEquations {
    fn new(dim: usize) -> Self {
        Self {
            dim,
            gram: vec![0.0; dim * dim],
            moment: vec![0.0; dim],
        }
    }

    fn add_row(&mut self, row: &[f64], y: f64) {
        for (i, &ri) in row.iter().enumerate() {
            self.moment[i] += ri * y;
            let gram_row = &mut self.gram[i * self.dim..(i + 1) * self.dim];
            for (g, &rj) in gram_row.iter_mut().zip(row) {
                *g += ri * rj;
            }
        }
    }

    fn add_to_diagonal(&mut self, i: usize, value: f64) {
        self.gram[i * self.dim + i] += value;
    }

    fn is_finite(&self) -> bool {
        all_finite(&self.gram) && all_finite(&self.moment)
    }

    /// Solve for the coefficients by Cholesky factorization.
    ///
    /// The factor overwrites the lower triangle of the gram matrix. Returns
    /// `None` unless the matrix is positive definite.
    fn solve(self) -> Option<Vec<f64>> {
        let Self {
            dim: n,
            mut gram,
            moment: mut x,
        } = self;
        if n == 0 {
            return None;
        }

        for j in 0..n {
            let pivot = gram[j * n + j] - (0..j).map(|k| gram[j * n + k].powi(2)).sum::<f64>();
            if pivot.is_nan() || pivot <= 0.0 {
                return None;
            }
            let pivot = pivot.sqrt();
            gram[j * n + j] = pivot;
            for i in j + 1..n {
                let dot: f64 = (0..j).map(|k| gram[i * n + k] * gram[j * n + k]).sum();
                gram[i * n + j] = (gram[i * n + j] - dot) / pivot;
            }
        }

        // L z = X'y, then L' beta = z, in place
        for i in 0..n {
            let dot: f64 = (0..i).map(|k| gram[i * n + k] * x[k]).sum();
            x[i] = (x[i] - dot) / gram[i * n + i];
        }
        for i in (0..n).rev() {
            let dot: f64 = (i + 1..n).map(|k| gram[k * n + i] * x[k]).sum();
            x[i] = (x[i] - dot) / gram[i * n + i];
        }

        Some(x)
    }
}
