//! Async entry point used by interactive callers.
//!
//! Training runs on tokio's blocking pool so the caller's executor stays
//! responsive. Starting a new run cancels the one still in flight.

use crate::core::{ForecastOutput, Observation, Variable};
use crate::error::{ForecastError, Result};
use crate::pipeline::runner::{run_batch, run_pipeline, BatchReport};
use crate::pipeline::{ForecastRequest, PipelineConfig};
use crate::utils::CancellationToken;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Owns the loaded observations and serves forecast runs over them.
#[derive(Debug)]
pub struct ForecastService {
    observations: Arc<[Observation]>,
    config: PipelineConfig,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl ForecastService {
    pub fn new(observations: Vec<Observation>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            observations: observations.into(),
            config,
            in_flight: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Train and roll out a forecast for one entity.
    ///
    /// A run superseded by a later call returns `Cancelled`.
    #[instrument(skip(self), fields(entity = %request.entity, variable = %request.variable))]
    pub async fn run_forecast(&self, request: ForecastRequest) -> Result<ForecastOutput> {
        let cancel = self.begin().await;
        let observations = Arc::clone(&self.observations);
        let config = self.config.clone();
        let token = cancel.clone();

        let result = tokio::task::spawn_blocking(move || {
            run_pipeline(&observations, &request, &config, &token)
        })
        .await
        .map_err(|e| ForecastError::ComputationError(format!("forecast task failed: {}", e)));

        self.finish(&cancel).await;
        result?
    }

    /// Forecast every entity for `variable`, one after another.
    ///
    /// Entities with too little history are listed in the report's `skipped`.
    #[instrument(skip(self))]
    pub async fn forecast_all(&self, variable: Variable) -> Result<BatchReport> {
        let cancel = self.begin().await;
        let observations = Arc::clone(&self.observations);
        let config = self.config.clone();
        let token = cancel.clone();

        let result = tokio::task::spawn_blocking(move || {
            run_batch(&observations, variable, &config, &token)
        })
        .await
        .map_err(|e| ForecastError::ComputationError(format!("batch task failed: {}", e)));

        self.finish(&cancel).await;
        result?
    }

    /// Whether a run is currently registered as in flight.
    pub async fn has_in_flight(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }

    /// Cancel the in-flight run, if any.
    pub async fn cancel_in_flight(&self) {
        if let Some(token) = self.in_flight.lock().await.take() {
            token.cancel();
            debug!("in-flight run cancelled");
        }
    }

    /// Register a new run, cancelling whichever run it supersedes.
    async fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut slot = self.in_flight.lock().await;
        if let Some(previous) = slot.replace(token.clone()) {
            previous.cancel();
            debug!("superseded in-flight run");
        }
        token
    }

    /// Clear the slot unless a newer run has already taken it.
    async fn finish(&self, token: &CancellationToken) {
        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.same_token(token)) {
            *slot = None;
        }
    }
}
