//! Residual summaries and the classical-vs-Bayesian comparison.

use crate::error::{BrainregError, Result};
use crate::stats;
use serde::Serialize;

/// Summary statistics of a residual vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualStats {
    /// Number of residuals
    pub n: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation (n-1)
    pub sd: f64,
    /// Root mean squared residual
    pub rmse: f64,
    /// Mean absolute residual
    pub mae: f64,
    /// Smallest residual
    pub min: f64,
    /// Largest residual
    pub max: f64,
}

impl ResidualStats {
    /// # Errors
    ///
    /// Returns `EmptyData` for an empty slice.
    pub fn from_residuals(residuals: &[f64]) -> Result<Self> {
        if residuals.is_empty() {
            return Err(BrainregError::empty_input("residuals"));
        }
        let n = residuals.len();
        let sd = stats::std_dev(residuals);
        Ok(Self {
            n,
            mean: stats::mean(residuals),
            sd: if sd.is_nan() { 0.0 } else { sd },
            rmse: (residuals.iter().map(|r| r * r).sum::<f64>() / n as f64).sqrt(),
            mae: residuals.iter().map(|r| r.abs()).sum::<f64>() / n as f64,
            min: residuals.iter().copied().fold(f64::INFINITY, f64::min),
            max: residuals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Residuals of the three fits side by side.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualComparison {
    /// Ordinary least squares
    pub classical: ResidualStats,
    /// Flat Bayesian model
    pub bayesian_linear: ResidualStats,
    /// Varying-intercept Bayesian model
    pub bayesian_hierarchical: ResidualStats,
    /// `max |r_ols − r_linear|` over rows
    pub max_abs_difference_linear: f64,
    /// Pearson correlation between OLS and flat-Bayesian residuals
    pub correlation_linear: f64,
}

impl ResidualComparison {
    /// Compares residuals computed on the same rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors differ in length or are empty.
    pub fn compare(classical: &[f64], linear: &[f64], hierarchical: &[f64]) -> Result<Self> {
        for (label, other) in [("bayesian_linear", linear), ("bayesian_hierarchical", hierarchical)] {
            if other.len() != classical.len() {
                return Err(BrainregError::dimension_mismatch(
                    label,
                    classical.len(),
                    other.len(),
                ));
            }
        }

        let max_abs_difference_linear = classical
            .iter()
            .zip(linear)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);

        Ok(Self {
            classical: ResidualStats::from_residuals(classical)?,
            bayesian_linear: ResidualStats::from_residuals(linear)?,
            bayesian_hierarchical: ResidualStats::from_residuals(hierarchical)?,
            max_abs_difference_linear,
            correlation_linear: stats::correlation(classical, linear),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_known_values() {
        let s = ResidualStats::from_residuals(&[-2.0, 0.0, 2.0]).expect("non-empty");
        assert_eq!(s.n, 3);
        assert_eq!(s.mean, 0.0);
        assert!((s.sd - 2.0).abs() < 1e-12);
        assert!((s.rmse - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((s.mae - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!((s.min, s.max), (-2.0, 2.0));
    }

    #[test]
    fn test_stats_single_value() {
        let s = ResidualStats::from_residuals(&[1.5]).expect("non-empty");
        assert_eq!(s.sd, 0.0);
        assert_eq!(s.rmse, 1.5);
    }

    #[test]
    fn test_stats_empty() {
        assert!(ResidualStats::from_residuals(&[]).is_err());
    }

    #[test]
    fn test_compare() {
        let ols = [1.0, -1.0, 0.5, -0.5];
        let lin = [1.1, -0.9, 0.4, -0.6];
        let hier = [0.5, -0.5, 0.2, -0.2];
        let cmp = ResidualComparison::compare(&ols, &lin, &hier).expect("same length");
        assert!((cmp.max_abs_difference_linear - 0.1).abs() < 1e-12);
        assert!(cmp.correlation_linear > 0.95);
        assert!(cmp.bayesian_hierarchical.rmse < cmp.classical.rmse);
    }

    #[test]
    fn test_compare_length_mismatch() {
        assert!(ResidualComparison::compare(&[1.0, 2.0], &[1.0], &[1.0, 2.0]).is_err());
        assert!(ResidualComparison::compare(&[1.0, 2.0], &[1.0, 2.0], &[1.0]).is_err());
    }
}
