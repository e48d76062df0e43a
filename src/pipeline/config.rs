//! Pipeline configuration.
//!
//! Values are layered: built-in defaults, then an optional file (TOML, YAML
//! or JSON by extension), then `CLIMATE_FORECAST__*` environment variables.
//! Nested keys use a double underscore, e.g. `CLIMATE_FORECAST__MLP__EPOCHS=120`.

use crate::error::{ForecastError, Result};
use crate::models::{
    AutoregressiveForecaster, BoxedRegressor, MlpConfig, MlpRegressor, RidgeConfig,
    RidgeRegressor, DEFAULT_HORIZON,
};
use crate::transform::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Prefix of the environment variables read by [`PipelineConfig::load`].
pub const ENV_PREFIX: &str = "CLIMATE_FORECAST";

/// Which regressor a run fits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Mlp,
    Ridge,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Mlp => write!(f, "mlp"),
            ModelKind::Ridge => write!(f, "ridge"),
        }
    }
}

/// Settings for one forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of monthly lags fed to the regressor.
    pub window: usize,
    /// Number of months to forecast.
    pub horizon: usize,
    pub model: ModelKind,
    pub mlp: MlpConfig,
    pub ridge: RidgeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
            model: ModelKind::default(),
            mlp: MlpConfig::default(),
            ridge: RidgeConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn with_mlp(mut self, mlp: MlpConfig) -> Self {
        self.mlp = mlp;
        self
    }

    pub fn with_ridge(mut self, ridge: RidgeConfig) -> Self {
        self.ridge = ridge;
        self
    }

    /// Load defaults, the optional file at `path`, then environment overrides.
    ///
    /// A missing file is an error when `path` is given explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: PipelineConfig = settings.try_deserialize()?;
        loaded.validate()?;
        debug!(
            window = loaded.window,
            horizon = loaded.horizon,
            model = %loaded.model,
            "configuration loaded"
        );
        Ok(loaded)
    }

    /// Reject settings no run could complete with.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(ForecastError::Config("window must be at least 1".into()));
        }
        if self.horizon == 0 {
            return Err(ForecastError::Config("horizon must be at least 1".into()));
        }
        match self.model {
            ModelKind::Mlp => self.mlp.validate(),
            ModelKind::Ridge => self.ridge.validate(),
        }
    }

    /// A fresh, unfitted regressor of the configured kind.
    pub fn build_regressor(&self) -> BoxedRegressor {
        match self.model {
            ModelKind::Mlp => Box::new(MlpRegressor::new(self.mlp.clone())),
            ModelKind::Ridge => Box::new(RidgeRegressor::new(self.ridge.clone())),
        }
    }

    pub fn forecaster(&self) -> Result<AutoregressiveForecaster> {
        AutoregressiveForecaster::new(self.window, self.horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_pipeline_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.window, 12);
        assert_eq!(config.horizon, 60);
        assert_eq!(config.model, ModelKind::Mlp);
        assert_eq!(config.mlp.hidden_units, 50);
        assert_eq!(config.mlp.epochs, 80);
        assert_eq!(config.mlp.batch_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = PipelineConfig::default()
            .with_window(6)
            .with_horizon(24)
            .with_model(ModelKind::Ridge)
            .with_ridge(RidgeConfig::default().with_lambda(0.5));
        assert_eq!(config.window, 6);
        assert_eq!(config.horizon, 24);
        assert_eq!(config.build_regressor().name(), "Ridge");
        assert_eq!(config.forecaster().unwrap().horizon(), 24);
    }

    #[test]
    fn validate_rejects_zero_window_and_horizon() {
        assert!(matches!(
            PipelineConfig::default().with_window(0).validate(),
            Err(ForecastError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::default().with_horizon(0).validate(),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn validate_checks_selected_model_only() {
        let bad_mlp = MlpConfig::default().with_epochs(0);
        let config = PipelineConfig::default()
            .with_mlp(bad_mlp)
            .with_model(ModelKind::Ridge);
        assert!(config.validate().is_ok());
        assert!(config.with_model(ModelKind::Mlp).validate().is_err());
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "window = 6\nhorizon = 12\nmodel = \"ridge\"\n\n[ridge]\nlambda = 0.25\n\n[mlp]\nepochs = 10"
        )
        .unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.window, 6);
        assert_eq!(config.horizon, 12);
        assert_eq!(config.model, ModelKind::Ridge);
        assert_eq!(config.ridge.lambda, 0.25);
        assert_eq!(config.mlp.epochs, 10);
        // untouched keys keep their defaults
        assert_eq!(config.mlp.hidden_units, 50);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "horizon = 0").unwrap();
        assert!(matches!(
            PipelineConfig::load(Some(file.path())),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn load_missing_file_is_error() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/forecast.toml"))).unwrap_err();
        assert!(matches!(err, ForecastError::Config(_)));
    }

    #[test]
    fn model_kind_parses_lowercase() {
        let kind: ModelKind = serde_json::from_str("\"ridge\"").unwrap();
        assert_eq!(kind, ModelKind::Ridge);
        assert_eq!(ModelKind::Mlp.to_string(), "mlp");
    }
}
