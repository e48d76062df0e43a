//! In-sample fit quality of a regressor on its training targets.

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Error summary of fitted values against the training targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// MAE relative to predicting each target with the previous one.
    /// None when consecutive targets never differ.
    pub mase: Option<f64>,
    /// Share of target variance explained by the fit.
    pub r_squared: f64,
}

impl AccuracyMetrics {
    /// Metrics of an exact fit.
    pub fn zero() -> Self {
        Self {
            mae: 0.0,
            mse: 0.0,
            rmse: 0.0,
            mase: Some(0.0),
            r_squared: 1.0,
        }
    }

    /// Score `fitted` against `targets`, both in framing order.
    pub fn evaluate(targets: &[f64], fitted: &[f64]) -> Result<Self> {
        if targets.len() != fitted.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: targets.len(),
                got: fitted.len(),
            });
        }
        if targets.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let n = targets.len() as f64;
        let (abs_sum, sq_sum) = targets
            .iter()
            .zip(fitted)
            .fold((0.0, 0.0), |(abs, sq), (y, f)| {
                let e = y - f;
                (abs + e.abs(), sq + e * e)
            });
        let mae = abs_sum / n;
        let mse = sq_sum / n;

        // one-step persistence on the targets themselves
        let persistence: Vec<f64> = targets.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let persistence_mae = if persistence.is_empty() {
            0.0
        } else {
            persistence.iter().sum::<f64>() / persistence.len() as f64
        };
        let mase = (persistence_mae > 0.0).then(|| mae / persistence_mae);

        let level = targets.iter().sum::<f64>() / n;
        let ss_tot: f64 = targets.iter().map(|y| (y - level).powi(2)).sum();
        let r_squared = match (ss_tot > 0.0, sq_sum > 0.0) {
            (true, _) => 1.0 - sq_sum / ss_tot,
            (false, false) => 1.0,
            (false, true) => 0.0,
        };

        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            mase,
            r_squared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exact_fit_matches_zero() {
        let targets = [22.0, 23.0, 24.0, 25.0];
        let metrics = AccuracyMetrics::evaluate(&targets, &targets).unwrap();
        assert_eq!(metrics, AccuracyMetrics::zero());
    }

    #[test]
    fn known_errors() {
        // errors: +1, -1, +2, 0
        let targets = [10.0, 12.0, 14.0, 16.0];
        let fitted = [9.0, 13.0, 12.0, 16.0];
        let metrics = AccuracyMetrics::evaluate(&targets, &fitted).unwrap();

        assert_relative_eq!(metrics.mae, 1.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.mse, 1.5, epsilon = 1e-12);
        assert_relative_eq!(metrics.rmse, 1.5f64.sqrt(), epsilon = 1e-12);
        // persistence error is 2 per step
        assert_relative_eq!(metrics.mase.unwrap(), 0.5, epsilon = 1e-12);
        // ss_tot = 9 + 1 + 1 + 9 = 20, ss_res = 6
        assert_relative_eq!(metrics.r_squared, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn flat_targets() {
        let exact = AccuracyMetrics::evaluate(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(exact.mase.is_none());
        assert_eq!(exact.r_squared, 1.0);

        let off = AccuracyMetrics::evaluate(&[5.0, 5.0], &[4.0, 6.0]).unwrap();
        assert_eq!(off.r_squared, 0.0);
    }

    #[test]
    fn single_target_has_no_mase() {
        let metrics = AccuracyMetrics::evaluate(&[3.0], &[2.5]).unwrap();
        assert!(metrics.mase.is_none());
        assert_relative_eq!(metrics.mae, 0.5);
    }

    #[test]
    fn reversed_fit_is_worse_than_the_mean() {
        let metrics =
            AccuracyMetrics::evaluate(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!(metrics.r_squared < 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            AccuracyMetrics::evaluate(&[1.0, 2.0], &[1.0]),
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert_eq!(
            AccuracyMetrics::evaluate(&[], &[]),
            Err(ForecastError::EmptyData)
        );
    }
}
