//! Utility functions shared by the pipeline stages.

pub mod cancel;
pub mod metrics;
pub mod stats;

pub use cancel::CancellationToken;
pub use metrics::AccuracyMetrics;
pub use stats::{all_finite, root_mean_square};
