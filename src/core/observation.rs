//! Raw observations and the monthly bucket key.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Climate variable carried by an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Average temperature (TAVG).
    #[default]
    Temperature,
    /// Precipitation (PRCP).
    Precipitation,
    /// Average wind speed (AWND).
    WindSpeed,
    /// Direction of the fastest 5-second wind (WDF5).
    WindDirection,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::Temperature,
        Variable::Precipitation,
        Variable::WindSpeed,
        Variable::WindDirection,
    ];

    /// Stable lowercase identifier, as used in config files and CSV headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Precipitation => "precipitation",
            Variable::WindSpeed => "wind_speed",
            Variable::WindDirection => "wind_direction",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "tavg" | "average_temp" => Ok(Variable::Temperature),
            "precipitation" | "prcp" => Ok(Variable::Precipitation),
            "wind_speed" | "windspeed" | "awnd" => Ok(Variable::WindSpeed),
            "wind_direction" | "winddirection" | "wdf5" => Ok(Variable::WindDirection),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown variable '{}'",
                other
            ))),
        }
    }
}

/// Calendar month used as the aggregation bucket.
///
/// Field order makes the derived `Ord` chronological: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a bucket key, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidObservation(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Bucket containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a compact `YYYYMMDD` date, as used by station exports.
    pub fn parse_compact_date(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y%m%d")
            .map(Self::from_date)
            .map_err(|e| ForecastError::InvalidObservation(format!("bad date '{}': {}", s, e)))
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single raw measurement for one entity in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    entity: String,
    period: YearMonth,
    values: BTreeMap<Variable, f64>,
}

impl Observation {
    /// Create an observation with no measured values yet.
    pub fn new(entity: impl Into<String>, year: i32, month: u32) -> Result<Self> {
        let entity = entity.into();
        if entity.trim().is_empty() {
            return Err(ForecastError::InvalidObservation(
                "entity must not be empty".to_string(),
            ));
        }
        Ok(Self {
            entity,
            period: YearMonth::new(year, month)?,
            values: BTreeMap::new(),
        })
    }

    /// Convenience constructor for a single temperature reading.
    pub fn temperature(entity: impl Into<String>, year: i32, month: u32, value: f64) -> Result<Self> {
        Self::new(entity, year, month)?.with_value(Variable::Temperature, value)
    }

    /// Attach a measured value, rejecting NaN and infinities.
    pub fn with_value(mut self, variable: Variable, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(ForecastError::InvalidObservation(format!(
                "{} for {} {} is not finite",
                variable, self.entity, self.period
            )));
        }
        self.values.insert(variable, value);
        Ok(self)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn period(&self) -> YearMonth {
        self.period
    }

    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.values.get(&variable).copied()
    }
}
