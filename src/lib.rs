//! # climate-forecast
//!
//! Monthly climate time-series forecasting.
//!
//! Observations are averaged into one chronological series per entity and
//! month, framed into 12-month windows, and used to fit a small regressor
//! (a one-hidden-layer MLP by default, or ridge regression). The fitted
//! regressor is then rolled out autoregressively over a 60-month horizon,
//! together with the root-mean-square training residual for drawing a band.

#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{ForecastOutput, Observation, Series, Variable, YearMonth};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{MlpConfig, Regressor, RidgeConfig};
    pub use crate::pipeline::{ForecastRequest, ForecastService, ModelKind, PipelineConfig};
    pub use crate::utils::CancellationToken;
}
