//! Monthly series built from raw observations.
//!
//! Observations are grouped by entity and calendar month; each populated
//! month becomes one point holding the arithmetic mean of the selected
//! variable. Months without observations are left out, never interpolated.

use crate::core::{Observation, Variable, YearMonth};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One aggregated month of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: YearMonth,
    pub value: f64,
}

/// Chronologically ordered monthly means for one entity and one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    entity: String,
    variable: Variable,
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from points, sorting them by period.
    pub fn new(entity: impl Into<String>, variable: Variable, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.period);
        Self {
            entity: entity.into(),
            variable,
            points,
        }
    }

    /// Build a series from consecutive monthly values starting at `start`.
    pub fn from_values(
        entity: impl Into<String>,
        variable: Variable,
        start: YearMonth,
        values: &[f64],
    ) -> Self {
        let mut period = start;
        let points = values
            .iter()
            .map(|&value| {
                let point = SeriesPoint { period, value };
                period = period.succ();
                point
            })
            .collect();
        Self {
            entity: entity.into(),
            variable,
            points,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn variable(&self) -> Variable {
        self.variable
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Period of the most recent point.
    pub fn last_period(&self) -> Option<YearMonth> {
        self.points.last().map(|p| p.period)
    }
}

#[derive(Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Build one series per entity for the selected variable.
///
/// Entities that have observations but none carrying `variable` still appear
/// with an empty series.
pub fn build_series(observations: &[Observation], variable: Variable) -> BTreeMap<String, Series> {
    let mut buckets: BTreeMap<&str, BTreeMap<YearMonth, MeanAccumulator>> = BTreeMap::new();

    for obs in observations {
        let months = buckets.entry(obs.entity()).or_default();
        if let Some(value) = obs.value(variable) {
            months.entry(obs.period()).or_default().push(value);
        }
    }

    buckets
        .into_iter()
        .map(|(entity, months)| {
            let points: Vec<SeriesPoint> = months
                .into_iter()
                .map(|(period, acc)| SeriesPoint {
                    period,
                    value: acc.mean(),
                })
                .collect();
            debug!(entity, %variable, buckets = points.len(), "built series");
            (
                entity.to_string(),
                Series {
                    entity: entity.to_string(),
                    variable,
                    points,
                },
            )
        })
        .collect()
}

/// Build the series for a single entity. Unknown entities yield an empty series.
pub fn build_entity_series(observations: &[Observation], entity: &str, variable: Variable) -> Series {
    let mut months: BTreeMap<YearMonth, MeanAccumulator> = BTreeMap::new();

    for obs in observations.iter().filter(|o| o.entity() == entity) {
        if let Some(value) = obs.value(variable) {
            months.entry(obs.period()).or_default().push(value);
        }
    }

    let points = months
        .into_iter()
        .map(|(period, acc)| SeriesPoint {
            period,
            value: acc.mean(),
        })
        .collect();

    Series {
        entity: entity.to_string(),
        variable,
        points,
    }
}

/// Distinct entities in sorted order.
pub fn entities(observations: &[Observation]) -> Vec<String> {
    observations
        .iter()
        .map(|o| o.entity())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(entity: &str, year: i32, month: u32, value: f64) -> Observation {
        Observation::temperature(entity, year, month, value).unwrap()
    }

    #[test]
    fn bucket_value_is_arithmetic_mean() {
        let data = vec![
            obs("CA", 2020, 1, 50.0),
            obs("CA", 2020, 1, 54.0),
            obs("CA", 2020, 1, 58.0),
            obs("CA", 2020, 2, 60.0),
        ];

        let series = build_entity_series(&data, "CA", Variable::Temperature);
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.points()[0].value, 54.0);
        assert_relative_eq!(series.points()[1].value, 60.0);
    }

    #[test]
    fn buckets_sort_chronologically_across_year_boundaries() {
        let data = vec![
            obs("NY", 2001, 2, 3.0),
            obs("NY", 2000, 10, 1.0),
            obs("NY", 2001, 1, 2.0),
            obs("NY", 2000, 9, 0.0),
            obs("NY", 1999, 12, -1.0),
        ];

        let series = build_entity_series(&data, "NY", Variable::Temperature);
        let labels: Vec<String> = series.points().iter().map(|p| p.period.to_string()).collect();
        assert_eq!(
            labels,
            vec!["1999-12", "2000-09", "2000-10", "2001-01", "2001-02"]
        );
        assert_eq!(series.values(), vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_months_are_not_interpolated() {
        let data = vec![obs("WA", 2020, 1, 40.0), obs("WA", 2020, 6, 70.0)];
        let series = build_entity_series(&data, "WA", Variable::Temperature);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn unknown_entity_yields_empty_series() {
        let data = vec![obs("WA", 2020, 1, 40.0)];
        let series = build_entity_series(&data, "OR", Variable::Temperature);
        assert!(series.is_empty());
        assert_eq!(series.entity(), "OR");
        assert_eq!(series.last_period(), None);
    }

    #[test]
    fn observations_without_the_variable_are_skipped() {
        let data = vec![
            obs("TX", 2020, 1, 60.0),
            Observation::new("TX", 2020, 2)
                .unwrap()
                .with_value(Variable::Precipitation, 1.2)
                .unwrap(),
        ];

        let temps = build_entity_series(&data, "TX", Variable::Temperature);
        assert_eq!(temps.len(), 1);

        let rain = build_entity_series(&data, "TX", Variable::Precipitation);
        assert_eq!(rain.len(), 1);
        assert_eq!(rain.points()[0].period, YearMonth::new(2020, 2).unwrap());
    }

    #[test]
    fn build_series_groups_by_entity() {
        let data = vec![
            obs("CA", 2020, 1, 50.0),
            obs("TX", 2020, 1, 60.0),
            obs("CA", 2020, 2, 52.0),
            obs("TX", 2020, 1, 62.0),
        ];

        let all = build_series(&data, Variable::Temperature);
        assert_eq!(all.len(), 2);
        assert_eq!(all["CA"].values(), vec![50.0, 52.0]);
        assert_eq!(all["TX"].values(), vec![61.0]);
        assert_eq!(all["CA"], build_entity_series(&data, "CA", Variable::Temperature));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let data: Vec<Observation> = (0..200)
            .map(|i| obs("FL", 2000 + (i % 7), (i % 12 + 1) as u32, 60.0 + (i as f64 * 0.37).sin()))
            .collect();

        let first = build_entity_series(&data, "FL", Variable::Temperature);
        let second = build_entity_series(&data, "FL", Variable::Temperature);
        assert_eq!(first, second);
    }

    #[test]
    fn entities_are_sorted_and_distinct() {
        let data = vec![
            obs("TX", 2020, 1, 1.0),
            obs("CA", 2020, 1, 1.0),
            obs("TX", 2020, 2, 1.0),
        ];
        assert_eq!(entities(&data), vec!["CA".to_string(), "TX".to_string()]);
    }

    #[test]
    fn from_values_assigns_consecutive_months() {
        let start = YearMonth::new(2020, 11).unwrap();
        let series = Series::from_values("CA", Variable::Temperature, start, &[1.0, 2.0, 3.0]);
        assert_eq!(series.last_period(), Some(YearMonth::new(2021, 1).unwrap()));
    }
}
