//! Fixed-width window framing for autoregressive training.
//!
//! A series of length `N` framed with window `W` produces `N - W` examples;
//! example `i` pairs `series[i..i + W]` with `series[i + W]`. Order is
//! preserved exactly as produced.

use crate::error::{ForecastError, Result};

/// Default window: twelve monthly lags.
pub const DEFAULT_WINDOW: usize = 12;

/// One supervised pair: the `W` values preceding `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub target: f64,
}

/// Training examples framed from one series with a fixed window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    window: usize,
    examples: Vec<TrainingExample>,
}

impl TrainingSet {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Input windows in framing order.
    pub fn inputs(&self) -> impl Iterator<Item = &[f64]> {
        self.examples.iter().map(|e| e.input.as_slice())
    }

    /// Targets in framing order.
    pub fn targets(&self) -> Vec<f64> {
        self.examples.iter().map(|e| e.target).collect()
    }

    /// The series the set was framed from: the first window followed by
    /// every target.
    pub fn observed_values(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.window + self.examples.len());
        if let Some(first) = self.examples.first() {
            values.extend_from_slice(&first.input);
        }
        values.extend(self.examples.iter().map(|e| e.target));
        values
    }
}

/// Frame a chronologically ordered series into training examples.
///
/// # Errors
/// * `InvalidParameter` if `window` is zero.
/// * `InsufficientData` if the series has `window` values or fewer.
pub fn frame_windows(series: &[f64], window: usize) -> Result<TrainingSet> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "window must be positive".to_string(),
        ));
    }
    if series.len() <= window {
        return Err(ForecastError::InsufficientData {
            needed: window + 1,
            got: series.len(),
        });
    }

    let examples = series
        .windows(window + 1)
        .map(|w| TrainingExample {
            input: w[..window].to_vec(),
            target: w[window],
        })
        .collect();

    Ok(TrainingSet { window, examples })
}

/// Number of examples `frame_windows` produces for a series of length `len`.
pub fn example_count(len: usize, window: usize) -> usize {
    len.saturating_sub(window)
}
