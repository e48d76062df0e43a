//! Core data structures: observations, monthly series and forecast output.

mod forecast;
mod observation;
mod series;

pub use forecast::{index_history, sigmas_for_level, ForecastOutput, IndexedPoint};
pub use observation::{Observation, Variable, YearMonth};
pub use series::{build_entity_series, build_series, entities, Series, SeriesPoint};
