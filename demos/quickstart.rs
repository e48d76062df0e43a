//! Quickstart: forecast a synthetic seasonal temperature series.
//!
//! Run with `cargo run --example quickstart`.

use climate_forecast::prelude::*;
use std::f64::consts::PI;

fn synthetic_observations(entity: &str, years: i32, base: f64) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    for year in 2000..2000 + years {
        for month in 1..=12u32 {
            let season = 12.0 * (2.0 * PI * (month as f64 - 4.0) / 12.0).sin();
            let warming = 0.03 * (year - 2000) as f64;
            // two stations per state and month, averaged by the series builder
            for offset in [-0.5, 0.5] {
                let value = base + season + warming + offset;
                observations.push(Observation::temperature(entity, year, month, value)?);
            }
        }
    }
    Ok(observations)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut observations = synthetic_observations("CA", 10, 60.0)?;
    observations.extend(synthetic_observations("AK", 10, 25.0)?);
    observations.extend(synthetic_observations("DC", 1, 55.0)?);

    println!("Climate forecast quickstart");
    println!("===========================\n");

    let service = ForecastService::new(observations, PipelineConfig::default())?;

    let output = service.run_forecast(ForecastRequest::new("CA")).await?;
    let (lower, upper) = output.band(1.0);

    println!("Entity: {} ({})", output.entity, output.variable);
    println!("Model: {}", output.model);
    println!("History: {} months", output.historical.len());
    println!("Residual spread (sigma): {:.3}", output.sigma);
    println!("Training RMSE: {:.3}\n", output.training.rmse);

    println!("First 12 forecast months:");
    for (i, point) in output.forecast.iter().take(12).enumerate() {
        println!(
            "  t={:>3} {}  {:>7.2}  [{:>7.2}, {:>7.2}]",
            point.t, point.period, point.value, lower[i], upper[i]
        );
    }

    // Batch run over every state; DC has only 12 months and is skipped.
    let ridge = PipelineConfig::default().with_model(ModelKind::Ridge);
    let batch = ForecastService::new(service.observations().to_vec(), ridge)?;
    let report = batch.forecast_all(Variable::Temperature).await?;

    println!("\nBatch (ridge):");
    for forecast in &report.forecasts {
        println!(
            "  {}: next month {:.2}, sigma {:.3}",
            forecast.entity, forecast.forecast[0].value, forecast.sigma
        );
    }
    for skipped in &report.skipped {
        println!("  {} skipped: {}", skipped.entity, skipped.reason);
    }

    Ok(())
}
