//! Regressor trait shared by the window-to-next-value models.

use crate::error::Result;
use crate::transform::TrainingSet;
use crate::utils::CancellationToken;

/// A function `f64^W -> f64` fit to framed training examples.
///
/// This trait is object-safe and can be used with `Box<dyn Regressor>`.
/// A fitted regressor belongs to a single pipeline run and is never shared.
pub trait Regressor: Send {
    /// Fit the regressor to the training set, checking `cancel` between passes.
    fn fit(&mut self, training: &TrainingSet, cancel: &CancellationToken) -> Result<()>;

    /// Predict the value following `input`, a window of the fitted width.
    fn predict(&self, input: &[f64]) -> Result<f64>;

    /// Get the fitted values (in-sample predictions), in framing order.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (target - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed regressor trait objects.
///
/// # Example
///
/// ```
/// use climate_forecast::models::{BoxedRegressor, MlpRegressor, Regressor};
///
/// let model: BoxedRegressor = Box::new(MlpRegressor::default());
/// assert_eq!(model.name(), "MLP");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedRegressor = Box<dyn Regressor>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MlpConfig, MlpRegressor, RidgeRegressor};
    use crate::transform::frame_windows;

    fn linear(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + i as f64).collect()
    }

    #[test]
    fn boxed_regressors_fit_and_predict() {
        let set = frame_windows(&linear(30), 12).unwrap();
        let cancel = CancellationToken::new();
        let models: Vec<BoxedRegressor> = vec![
            Box::new(MlpRegressor::new(MlpConfig::default().with_epochs(10))),
            Box::new(RidgeRegressor::default()),
        ];

        for mut model in models {
            assert!(!model.is_fitted());
            model.fit(&set, &cancel).unwrap();
            assert!(model.is_fitted());
            assert_eq!(model.fitted_values().unwrap().len(), set.len());
            assert_eq!(model.residuals().unwrap().len(), set.len());
            assert!(model.predict(&set.examples()[0].input).unwrap().is_finite());
        }
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let set = frame_windows(&linear(30), 12).unwrap();
        let mut first: BoxedRegressor = Box::new(RidgeRegressor::default());
        let second: BoxedRegressor = Box::new(RidgeRegressor::default());

        first.fit(&set, &CancellationToken::new()).unwrap();

        assert!(first.is_fitted());
        assert!(!second.is_fitted());
    }
}
