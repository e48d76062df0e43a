//! Standardization used to condition regressor inputs.

/// Center and scale fitted on a series, applied to windows and targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardizer {
    /// Mean of the fitted values
    pub center: f64,
    /// Sample standard deviation of the fitted values (1.0 when degenerate)
    pub scale: f64,
}

impl Default for Standardizer {
    fn default() -> Self {
        Self {
            center: 0.0,
            scale: 1.0,
        }
    }
}

impl Standardizer {
    /// Fit to zero mean and unit variance (z-score normalization).
    ///
    /// x_scaled = (x - mean) / std
    pub fn fit(series: &[f64]) -> Self {
        if series.is_empty() {
            return Self::default();
        }

        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;

        let variance = if series.len() > 1 {
            series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let std = variance.sqrt();

        Self {
            center: mean,
            scale: if std < 1e-10 { 1.0 } else { std },
        }
    }

    pub fn transform_value(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }

    pub fn inverse_value(&self, z: f64) -> f64 {
        z * self.scale + self.center
    }

    /// Transform data using the fitted parameters.
    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&x| self.transform_value(x)).collect()
    }

    /// Inverse transform to recover original scale.
    pub fn inverse(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&z| self.inverse_value(z)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn standardize_has_zero_mean_unit_variance() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let scaler = Standardizer::fit(&series);
        let z = scaler.transform(&series);

        let mean: f64 = z.iter().sum::<f64>() / z.len() as f64;
        let var: f64 = z.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (z.len() - 1) as f64;

        assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
        assert_relative_eq!(var, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn inverse_recovers_original() {
        let series = vec![10.0, 20.0, 30.0, 40.0];
        let scaler = Standardizer::fit(&series);
        let recovered = scaler.inverse(&scaler.transform(&series));

        for (a, b) in series.iter().zip(recovered.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn constant_series_keeps_unit_scale() {
        let scaler = Standardizer::fit(&[5.0, 5.0, 5.0]);
        assert_relative_eq!(scaler.center, 5.0);
        assert_relative_eq!(scaler.scale, 1.0);
        assert_relative_eq!(scaler.transform_value(5.0), 0.0);
    }

    #[test]
    fn empty_series_is_identity() {
        let scaler = Standardizer::fit(&[]);
        assert_relative_eq!(scaler.transform_value(3.0), 3.0);
    }
}
