//! Statistical utility functions.

/// Root mean square of a slice.
pub fn root_mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

/// Whether every value in the slice is finite.
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn root_mean_square_of_values() {
        assert_relative_eq!(root_mean_square(&[3.0, -3.0]), 3.0);
        assert_relative_eq!(root_mean_square(&[0.0, 0.0]), 0.0);
        assert!(root_mean_square(&[]).is_nan());
    }

    #[test]
    fn detects_non_finite() {
        assert!(all_finite(&[1.0, 2.0]));
        assert!(!all_finite(&[1.0, f64::NAN]));
        assert!(!all_finite(&[f64::INFINITY]));
    }
}
