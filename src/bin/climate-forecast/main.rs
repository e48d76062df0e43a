//! # climate-forecast
//!
//! Command-line front end: loads a CSV of monthly observations, runs the
//! forecasting pipeline and writes the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use climate_forecast::core::{sigmas_for_level, ForecastOutput, Variable};
use climate_forecast::pipeline::{ForecastRequest, ForecastService, ModelKind, PipelineConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod loader;

#[derive(Parser)]
#[command(name = "climate-forecast")]
#[command(about = "Monthly climate forecasting from historical observations")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "CLIMATE_FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured regressor (mlp, ridge)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast one entity
    Forecast {
        /// Input CSV with state, year, month and measurement columns
        #[arg(short, long)]
        input: PathBuf,

        /// Entity (state) to forecast
        #[arg(short, long)]
        entity: String,

        /// Variable to forecast (temperature, precipitation, wind_speed, wind_direction)
        #[arg(short, long, default_value = "temperature")]
        variable: String,

        /// Half-width of the band written with the forecast, in multiples of sigma
        #[arg(short, long, default_value = "1.0")]
        sigmas: f64,

        /// Two-sided normal coverage level; replaces --sigmas when given
        #[arg(short, long, conflicts_with = "sigmas")]
        level: Option<f64>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forecast every entity in the input
    ForecastAll {
        /// Input CSV with state, year, month and measurement columns
        #[arg(short, long)]
        input: PathBuf,

        /// Variable to forecast
        #[arg(short, long, default_value = "temperature")]
        variable: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A forecast with its band, as written to JSON.
#[derive(Serialize)]
struct ForecastDocument {
    #[serde(flatten)]
    output: ForecastOutput,
    sigmas: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ForecastDocument {
    /// Attach a band of `sigmas` spreads, or of the normal coverage `level` when given.
    fn new(output: ForecastOutput, sigmas: f64, level: Option<f64>) -> Result<Self> {
        let sigmas = match level {
            Some(level) => sigmas_for_level(level)?,
            None => sigmas,
        };
        let (lower, upper) = output.band(sigmas);
        Ok(Self {
            output,
            sigmas,
            level,
            lower,
            upper,
        })
    }
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())
            .context("failed to load configuration")?;
        if let Some(model) = &self.model {
            let kind = match model.to_ascii_lowercase().as_str() {
                "mlp" => ModelKind::Mlp,
                "ridge" => ModelKind::Ridge,
                other => anyhow::bail!("unknown model '{}', expected mlp or ridge", other),
            };
            config = config.with_model(kind);
            config.validate()?;
        }
        Ok(config)
    }

    async fn run(self) -> Result<()> {
        let config = self.pipeline_config()?;

        match self.command {
            Commands::Forecast {
                input,
                entity,
                variable,
                sigmas,
                level,
                output,
            } => {
                let variable: Variable = variable.parse()?;
                let observations = loader::load_observations(&input)?;
                let service = ForecastService::new(observations, config)?;

                let request = ForecastRequest::new(entity).with_variable(variable);
                let forecast = service
                    .run_forecast(request.clone())
                    .await
                    .with_context(|| format!("forecast for {} failed", request.entity))?;
                info!(
                    entity = %forecast.entity,
                    model = %forecast.model,
                    sigma = forecast.sigma,
                    "writing forecast"
                );
                let document = ForecastDocument::new(forecast, sigmas, level)?;
                write_json(&document, output.as_deref())?;
            }
            Commands::ForecastAll {
                input,
                variable,
                output,
            } => {
                let variable: Variable = variable.parse()?;
                let observations = loader::load_observations(&input)?;
                let service = ForecastService::new(observations, config)?;

                let report = service.forecast_all(variable).await?;
                info!(
                    forecasts = report.forecasts.len(),
                    skipped = report.skipped.len(),
                    "writing batch report"
                );
                write_json(&report, output.as_deref())?;
            }
        }
        Ok(())
    }
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            info!(path = %path.display(), "output written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_forecast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    Cli::parse().run().await
}
