//! Property-based tests for the forecasting pipeline.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated observations and series.

use climate_forecast::core::{build_series, Observation, Series, Variable, YearMonth};
use climate_forecast::models::{
    residual_spread, AutoregressiveForecaster, Regressor, RidgeRegressor,
};
use climate_forecast::transform::{example_count, frame_windows};
use climate_forecast::utils::CancellationToken;
use proptest::prelude::*;

/// Create a monthly Series starting January 2000.
fn make_series(values: &[f64]) -> Series {
    let start = YearMonth::new(2000, 1).unwrap();
    Series::from_values("CA", Variable::Temperature, start, values)
}

/// Strategy for generating valid series values.
/// Avoids extreme values that could cause numerical issues.
fn valid_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-50.0..50.0_f64, min_len..max_len)
}

/// Strategy for generating series with trend.
fn trending_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (0.0..100.0_f64, -2.0..2.0_f64)
            .prop_map(move |(base, slope)| (0..len).map(|i| base + slope * i as f64).collect())
    })
}

/// Strategy for raw observations over a few entities and years.
///
/// Values are whole numbers so bucket means do not depend on summation order.
fn observations_strategy() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["CA", "NV", "TX"]),
            1990..1995_i32,
            1..=12_u32,
            -40..40_i32,
        ),
        0..120,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(entity, year, month, value)| {
                Observation::temperature(entity, year, month, value as f64).unwrap()
            })
            .collect()
    })
}

// =============================================================================
// Property: framing produces len - W examples with the documented layout
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn window_count_and_layout(values in valid_values_strategy(1, 80), window in 1usize..20) {
        match frame_windows(&values, window) {
            Ok(set) => {
                prop_assert!(values.len() > window);
                prop_assert_eq!(set.len(), values.len() - window);
                prop_assert_eq!(set.len(), example_count(values.len(), window));
                for (i, example) in set.examples().iter().enumerate() {
                    prop_assert_eq!(&example.input[..], &values[i..i + window]);
                    prop_assert_eq!(example.target, values[i + window]);
                }
            }
            Err(err) => {
                prop_assert!(values.len() <= window);
                prop_assert!(err.is_insufficient_data());
            }
        }
    }
}

// =============================================================================
// Property: series building is deterministic and chronological
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn aggregation_ignores_input_order(
        (original, shuffled) in observations_strategy()
            .prop_flat_map(|obs| (Just(obs.clone()), Just(obs).prop_shuffle()))
    ) {
        let a = build_series(&original, Variable::Temperature);
        let b = build_series(&shuffled, Variable::Temperature);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn series_are_strictly_chronological(observations in observations_strategy()) {
        for series in build_series(&observations, Variable::Temperature).values() {
            let periods: Vec<YearMonth> = series.points().iter().map(|p| p.period).collect();
            prop_assert!(periods.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn bucket_means_stay_within_observed_range(observations in observations_strategy()) {
        for (entity, series) in build_series(&observations, Variable::Temperature) {
            for point in series.points() {
                let bucket: Vec<f64> = observations
                    .iter()
                    .filter(|o| o.entity() == entity && o.period() == point.period)
                    .filter_map(|o| o.value(Variable::Temperature))
                    .collect();
                let lo = bucket.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = bucket.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(!bucket.is_empty());
                prop_assert!(point.value >= lo && point.value <= hi);
            }
        }
    }
}

// =============================================================================
// Property: rollout length and index continuity
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn rollout_has_horizon_contiguous_points(
        values in trending_values_strategy(13, 72),
        horizon in 1usize..80,
    ) {
        let series = make_series(&values);
        let set = frame_windows(&values, 12).unwrap();
        let cancel = CancellationToken::new();
        let mut model = RidgeRegressor::default();
        model.fit(&set, &cancel).unwrap();

        let forecaster = AutoregressiveForecaster::new(12, horizon).unwrap();
        let output = forecaster.forecast(&series, &set, &model, &cancel).unwrap();

        prop_assert_eq!(output.forecast.len(), horizon);
        let n = values.len();
        for (i, point) in output.forecast.iter().enumerate() {
            prop_assert_eq!(point.t, n + i + 1);
        }
        let mut expected = series.last_period().unwrap();
        for point in &output.forecast {
            expected = expected.succ();
            prop_assert_eq!(point.period, expected);
        }
        prop_assert!(output.sigma >= 0.0);
    }
}

// =============================================================================
// Property: residual spread is non-negative and zero only for exact fits
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn residual_spread_non_negative(
        pairs in prop::collection::vec((-100.0..100.0_f64, -100.0..100.0_f64), 1..50)
    ) {
        let (targets, predicted): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let sigma = residual_spread(&targets, &predicted).unwrap();
        prop_assert!(sigma >= 0.0);
        if targets != predicted {
            prop_assert!(sigma > 0.0);
        }
        prop_assert_eq!(residual_spread(&targets, &targets).unwrap(), 0.0);
    }
}
