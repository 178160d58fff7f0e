//! Column normalization
//!
//! This module z-scores predictor columns so that stimulus and history
//! regressors share a common scale:
//! - Sample mean and standard deviation (n - 1 denominator)
//! - Constant or single-value columns collapse to zero instead of NaN

/// Normalizer for standardizing numeric columns
pub struct Normalizer;

impl Normalizer {
    /// Z-score a column. Columns with no spread are returned centered (all zero).
    pub fn standardize(values: &[f64]) -> Vec<f64> {
        let Some(mu) = mean(values) else {
            return Vec::new();
        };

        match sample_std(values) {
            Some(sd) if sd > 0.0 && sd.is_finite() => {
                values.iter().map(|v| (v - mu) / sd).collect()
            }
            _ => vec![0.0; values.len()],
        }
    }

    /// Element-wise mean of two aligned columns
    pub fn pairwise_mean(a: &[f64], b: &[f64]) -> Vec<f64> {
        a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect()
    }
}

/// Arithmetic mean, None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation, None with fewer than two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardize() {
        let z = Normalizer::standardize(&[1.0, 2.0, 3.0]);

        // mean 2, sample std 1
        assert!((z[0] + 1.0).abs() < 1e-12);
        assert!(z[1].abs() < 1e-12);
        assert!((z[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_standardize_constant_column() {
        assert_eq!(Normalizer::standardize(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(Normalizer::standardize(&[5.0]), vec![0.0]);
        assert!(Normalizer::standardize(&[]).is_empty());
    }

    #[test]
    fn test_sample_std() {
        let sd = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        // population std is 2.0; sample std = sqrt(32 / 7)
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn test_pairwise_mean() {
        assert_eq!(
            Normalizer::pairwise_mean(&[60.0, 70.0], &[68.0, 62.0]),
            vec![64.0, 66.0]
        );
    }
}
