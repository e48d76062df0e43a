//! Regressors and the autoregressive forecaster that rolls them out.

mod traits;

pub mod autoregressive;
pub mod mlp;
pub mod ridge;

pub use autoregressive::{residual_spread, AutoregressiveForecaster, DEFAULT_HORIZON};
pub use mlp::{MlpConfig, MlpRegressor};
pub use ridge::{RidgeConfig, RidgeRegressor};
pub use traits::{BoxedRegressor, Regressor};
