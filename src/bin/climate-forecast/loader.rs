//! CSV ingestion of monthly climate observations.

use anyhow::{Context, Result};
use climate_forecast::core::{Observation, Variable, YearMonth};
use climate_forecast::ForecastError;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// One CSV row. Missing measurements are left empty.
///
/// The month comes from `year` and `month` columns, or from a compact
/// `YYYYMMDD` `date` column as in daily station exports. Station column names
/// are accepted in lower or upper case (`TAVG`, `PRCP`, ...). Without an
/// explicit temperature, the midpoint of `tmin` and `tmax` is used.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    #[serde(alias = "entity")]
    state: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    month: Option<u32>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, alias = "tavg", alias = "TAVG", alias = "average_temp")]
    temperature: Option<f64>,
    #[serde(default, alias = "TMIN")]
    tmin: Option<f64>,
    #[serde(default, alias = "TMAX")]
    tmax: Option<f64>,
    #[serde(default, alias = "prcp", alias = "PRCP")]
    precipitation: Option<f64>,
    #[serde(default, alias = "awnd", alias = "AWND")]
    wind_speed: Option<f64>,
    #[serde(default, alias = "wdf5", alias = "WDF5")]
    wind_direction: Option<f64>,
}

impl ObservationRecord {
    fn period(&self) -> climate_forecast::Result<YearMonth> {
        match (self.year, self.month, self.date.as_deref()) {
            (Some(year), Some(month), _) => YearMonth::new(year, month),
            (_, _, Some(date)) => YearMonth::parse_compact_date(date),
            _ => Err(ForecastError::InvalidObservation(
                "row needs year and month, or date".into(),
            )),
        }
    }

    fn temperature(&self) -> Option<f64> {
        match (self.temperature, self.tmin, self.tmax) {
            (Some(t), _, _) => Some(t),
            (None, Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            _ => None,
        }
    }

    fn into_observation(self) -> climate_forecast::Result<Observation> {
        let period = self.period()?;
        let measurements = [
            (Variable::Temperature, self.temperature()),
            (Variable::Precipitation, self.precipitation),
            (Variable::WindSpeed, self.wind_speed),
            (Variable::WindDirection, self.wind_direction),
        ];
        let mut observation = Observation::new(self.state.trim(), period.year(), period.month())?;
        for (variable, value) in measurements {
            if let Some(value) = value {
                observation = observation.with_value(variable, value)?;
            }
        }
        Ok(observation)
    }
}

/// Load observations from a CSV file with a header row.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let observations = read_observations(BufReader::new(file))
        .with_context(|| format!("failed to load {}", path.display()))?;
    debug!(rows = observations.len(), path = %path.display(), "observations loaded");
    Ok(observations)
}

fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut observations = Vec::new();

    for (index, row) in reader.deserialize::<ObservationRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = row.with_context(|| format!("malformed row at line {}", line))?;
        let observation = record
            .into_observation()
            .with_context(|| format!("invalid observation at line {}", line))?;
        observations.push(observation);
    }

    Ok(observations)
}
