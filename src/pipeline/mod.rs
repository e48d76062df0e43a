//! End-to-end forecasting runs.
//!
//! # Example
//!
//! ```
//! use climate_forecast::core::Observation;
//! use climate_forecast::pipeline::{run_pipeline, ForecastRequest, ModelKind, PipelineConfig};
//! use climate_forecast::utils::CancellationToken;
//!
//! let observations: Vec<Observation> = (0..24)
//!     .map(|i| Observation::temperature("CA", 2020 + i / 12, (i % 12) as u32 + 1, 10.0 + i as f64).unwrap())
//!     .collect();
//!
//! let config = PipelineConfig::default().with_model(ModelKind::Ridge);
//! let output = run_pipeline(
//!     &observations,
//!     &ForecastRequest::new("CA"),
//!     &config,
//!     &CancellationToken::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(output.forecast.len(), 60);
//! assert_eq!(output.forecast[0].t, 25);
//! ```

mod config;
mod request;
mod runner;
mod service;

pub use config::{ModelKind, PipelineConfig, ENV_PREFIX};
pub use request::ForecastRequest;
pub use runner::{forecast_series, run_batch, run_pipeline, BatchReport, SkippedEntity};
pub use service::ForecastService;
