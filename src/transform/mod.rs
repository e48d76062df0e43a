//! Series transformations ahead of model fitting.
//!
//! # Example
//!
//! ```
//! use climate_forecast::transform::{frame_windows, Standardizer};
//!
//! let series: Vec<f64> = (10..30).map(|v| v as f64).collect();
//!
//! // Frame 12-month windows paired with the following value
//! let set = frame_windows(&series, 12).unwrap();
//! assert_eq!(set.len(), 8);
//!
//! // Standardize to zero mean, unit variance
//! let scaler = Standardizer::fit(&series);
//! let z = scaler.transform(&series);
//! assert_eq!(z.len(), series.len());
//! ```

pub mod scale;
pub mod window;

pub use scale::Standardizer;
pub use window::{example_count, frame_windows, TrainingExample, TrainingSet, DEFAULT_WINDOW};
