//! Synchronous pipeline: series builder, window framer, regressor, rollout.

use crate::core::{build_entity_series, entities, ForecastOutput, Observation, Series, Variable};
use crate::error::{ForecastError, Result};
use crate::pipeline::{ForecastRequest, PipelineConfig};
use crate::transform::frame_windows;
use crate::utils::CancellationToken;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Run the full pipeline for one entity.
///
/// Every call builds its own series, training set and regressor.
#[instrument(
    skip(observations, config, cancel),
    fields(entity = %request.entity, variable = %request.variable)
)]
pub fn run_pipeline(
    observations: &[Observation],
    request: &ForecastRequest,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<ForecastOutput> {
    config.validate()?;
    cancel.check()?;
    let series = build_entity_series(observations, &request.entity, request.variable);
    forecast_series(&series, config, cancel)
}

/// Fit a fresh regressor on an already-built series and roll it out.
pub fn forecast_series(
    series: &Series,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<ForecastOutput> {
    let forecaster = config.forecaster()?;
    let training = frame_windows(&series.values(), config.window)?;
    debug!(points = series.len(), examples = training.len(), "framed series");

    let mut regressor = config.build_regressor();
    regressor.fit(&training, cancel)?;

    let output = forecaster.forecast(series, &training, regressor.as_ref(), cancel)?;
    info!(
        entity = series.entity(),
        model = regressor.name(),
        horizon = output.horizon(),
        sigma = output.sigma,
        "forecast complete"
    );
    Ok(output)
}

/// An entity left out of a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub entity: String,
    pub reason: String,
}

/// Forecasts for every entity that had enough data.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub variable: Variable,
    pub forecasts: Vec<ForecastOutput>,
    pub skipped: Vec<SkippedEntity>,
}

impl BatchReport {
    pub fn get(&self, entity: &str) -> Option<&ForecastOutput> {
        self.forecasts.iter().find(|f| f.entity == entity)
    }
}

/// Forecast every entity in turn, skipping those with too little history.
///
/// Any other failure, including cancellation, aborts the batch.
#[instrument(skip(observations, config, cancel), fields(variable = %variable))]
pub fn run_batch(
    observations: &[Observation],
    variable: Variable,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<BatchReport> {
    config.validate()?;
    let mut report = BatchReport {
        variable,
        forecasts: Vec::new(),
        skipped: Vec::new(),
    };

    for entity in entities(observations) {
        let request = ForecastRequest::new(entity.as_str()).with_variable(variable);
        match run_pipeline(observations, &request, config, cancel) {
            Ok(output) => report.forecasts.push(output),
            Err(err @ ForecastError::InsufficientData { .. }) => {
                warn!(entity = %entity, error = %err, "skipping entity");
                report.skipped.push(SkippedEntity {
                    entity,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        forecasts = report.forecasts.len(),
        skipped = report.skipped.len(),
        "batch complete"
    );
    Ok(report)
}
