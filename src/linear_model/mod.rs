//! Classical linear regression.
//!
//! Ordinary Least Squares with the usual inference table (standard errors,
//! t statistics, p-values, R², F test). Serves as the baseline the Bayesian
//! fits are compared against.

use crate::error::{BrainregError, Result};
use crate::primitives::{Matrix, Vector};
use crate::stats::{f_survival, t_quantile, t_two_sided_pvalue};
use serde::Serialize;

/// Name given to the intercept term in summaries.
pub const INTERCEPT: &str = "(Intercept)";

/// Ordinary Least Squares (OLS) linear regression with an intercept.
///
/// ```text
/// y = β₀ + X β + ε,   ε ~ N(0, σ² I)
/// ```
///
/// # Solver
///
/// Normal equations `β = (XᵀX)⁻¹ Xᵀy` via Cholesky decomposition.
///
/// # Examples
///
/// ```
/// use brainreg::linear_model::OrdinaryLeastSquares;
/// use brainreg::primitives::{Matrix, Vector};
///
/// // y = 2x + 1 plus a little noise
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[3.1, 4.9, 7.0, 9.1, 10.9]);
///
/// let fit = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).unwrap();
/// assert!((fit.coefficients[1] - 2.0).abs() < 0.1);
/// assert!(fit.r_squared > 0.99);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrdinaryLeastSquares;

impl OrdinaryLeastSquares {
    /// Creates a new estimator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fits the model. `names` labels the columns of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Input dimensions don't match
    /// - There are no residual degrees of freedom (n ≤ p + 1)
    /// - The design is collinear (XᵀX not positive definite)
    pub fn fit(&self, x: &Matrix<f64>, y: &Vector<f64>, names: &[&str]) -> Result<OlsFit> {
        let (n, p) = x.shape();

        if n != y.len() {
            return Err(BrainregError::dimension_mismatch("rows in X", n, y.len()));
        }
        if names.len() != p {
            return Err(BrainregError::dimension_mismatch("predictor names", p, names.len()));
        }
        let k = p + 1;
        if n <= k {
            return Err(BrainregError::InsufficientSamples { needed: k, got: n });
        }

        let design = x.with_intercept_column();
        let xtx = design.gram();
        let xty = design.t_matvec(y)?;

        let xtx_inv = xtx
            .inverse_spd()
            .map_err(|_| BrainregError::singular("OLS normal equations"))?;
        let beta = xtx_inv.matvec(&xty)?;

        let fitted = design.matvec(&beta)?;
        let residuals: Vec<f64> = y
            .iter()
            .zip(fitted.iter())
            .map(|(obs, pred)| obs - pred)
            .collect();

        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let y_mean = y.mean();
        let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

        let df_residual = n - k;
        let sigma2 = rss / df_residual as f64;

        let std_errors: Vec<f64> = (0..k).map(|j| (sigma2 * xtx_inv.get(j, j)).sqrt()).collect();
        let t_values: Vec<f64> = beta
            .iter()
            .zip(&std_errors)
            .map(|(b, se)| b / se)
            .collect();
        let p_values: Vec<f64> = t_values
            .iter()
            .map(|&t| t_two_sided_pvalue(t, df_residual as f64))
            .collect();

        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_residual as f64;

        let (f_statistic, f_pvalue) = if p > 0 && rss > 0.0 {
            let f = ((tss - rss) / p as f64) / sigma2;
            (f, f_survival(f, p as f64, df_residual as f64))
        } else {
            (f64::NAN, f64::NAN)
        };

        tracing::debug!(n, p, r_squared, "OLS fitted");

        Ok(OlsFit {
            names: std::iter::once(INTERCEPT.to_string())
                .chain(names.iter().map(|s| (*s).to_string()))
                .collect(),
            coefficients: beta.into_vec(),
            std_errors,
            t_values,
            p_values,
            residual_std_error: sigma2.sqrt(),
            df_residual,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_pvalue,
            n_observations: n,
            fitted: fitted.into_vec(),
            residuals,
        })
    }
}

/// A fitted OLS model with its inference table.
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    /// Term names, intercept first
    pub names: Vec<String>,
    /// Estimates, intercept first
    pub coefficients: Vec<f64>,
    /// Standard errors
    pub std_errors: Vec<f64>,
    /// t statistics
    pub t_values: Vec<f64>,
    /// Two-sided p-values
    pub p_values: Vec<f64>,
    /// Residual standard error σ̂
    pub residual_std_error: f64,
    /// n - p - 1
    pub df_residual: usize,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Adjusted R²
    pub adj_r_squared: f64,
    /// Overall F statistic
    pub f_statistic: f64,
    /// p-value of the F test
    pub f_pvalue: f64,
    /// Rows used
    pub n_observations: usize,
    /// In-sample predictions
    #[serde(skip)]
    pub fitted: Vec<f64>,
    /// `y - fitted`
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

impl OlsFit {
    /// Estimate for a named term.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficients[i])
    }

    /// Confidence intervals at `level` (e.g. 0.95), one per term.
    #[must_use]
    pub fn conf_int(&self, level: f64) -> Vec<(f64, f64)> {
        let t = t_quantile(0.5 + level / 2.0, self.df_residual as f64);
        self.coefficients
            .iter()
            .zip(&self.std_errors)
            .map(|(b, se)| (b - t * se, b + t * se))
            .collect()
    }

    /// Predicts for new rows (without intercept column).
    ///
    /// # Errors
    ///
    /// Returns an error if the column count doesn't match the fit.
    pub fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        if x.n_cols() + 1 != self.coefficients.len() {
            return Err(BrainregError::dimension_mismatch(
                "predictor columns",
                self.coefficients.len() - 1,
                x.n_cols(),
            ));
        }
        let beta = Vector::from_slice(&self.coefficients);
        Ok(x.with_intercept_column().matvec(&beta)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fit() {
        // y = 1 + 2*x1 + 3*x2
        let x = Matrix::from_vec(5, 2, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 5.0])
            .expect("5*2=10 elements");
        let y = Vector::from_slice(&[6.0, 8.0, 9.0, 11.0, 22.0]);

        let fit = OrdinaryLeastSquares::new()
            .fit(&x, &y, &["x1", "x2"])
            .expect("well-posed design");

        assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((fit.coefficient("x1").expect("named") - 2.0).abs() < 1e-9);
        assert!((fit.coefficient("x2").expect("named") - 3.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.df_residual, 2);
        for r in &fit.residuals {
            assert!(r.abs() < 1e-9);
        }
    }

    #[test]
    fn test_simple_regression_inference() {
        // Hand-computed: x = 1..5, y = [2, 4, 5, 4, 5]
        // b1 = 0.6, b0 = 2.2, RSS = 2.4, σ² = 0.8, Sxx = 10
        let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).expect("5 elements");
        let y = Vector::from_slice(&[2.0, 4.0, 5.0, 4.0, 5.0]);
        let fit = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).expect("fit");

        assert!((fit.coefficients[0] - 2.2).abs() < 1e-9);
        assert!((fit.coefficients[1] - 0.6).abs() < 1e-9);
        assert!((fit.residual_std_error - 0.8_f64.sqrt()).abs() < 1e-9);
        // se(b1) = sqrt(σ² / Sxx)
        assert!((fit.std_errors[1] - (0.8_f64 / 10.0).sqrt()).abs() < 1e-9);
        // R² = 1 - RSS/TSS = 1 - 2.4/6
        assert!((fit.r_squared - 0.6).abs() < 1e-9);
        // F = t² for a single predictor
        assert!((fit.f_statistic - fit.t_values[1].powi(2)).abs() < 1e-9);
        assert!((fit.f_pvalue - fit.p_values[1]).abs() < 1e-9);
    }

    #[test]
    fn test_conf_int_contains_estimate() {
        let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("6 elements");
        let y = Vector::from_slice(&[1.1, 1.9, 3.2, 3.9, 5.1, 6.0]);
        let fit = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).expect("fit");
        for ((lo, hi), b) in fit.conf_int(0.95).iter().zip(&fit.coefficients) {
            assert!(lo < b && b < hi);
        }
    }

    #[test]
    fn test_predict_matches_fitted() {
        let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 5.0]).expect("4 elements");
        let y = Vector::from_slice(&[3.0, 5.5, 6.5, 11.0]);
        let fit = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).expect("fit");
        let pred = fit.predict(&x).expect("same columns");
        for (a, b) in pred.iter().zip(&fit.fitted) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_insufficient_samples() {
        let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("2 elements");
        let y = Vector::from_slice(&[1.0, 2.0]);
        let err = OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).unwrap_err();
        assert!(matches!(err, BrainregError::InsufficientSamples { .. }));
    }

    #[test]
    fn test_collinear_design_is_singular() {
        let x = Matrix::from_vec(4, 2, vec![1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0])
            .expect("4*2=8 elements");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.5]);
        let err = OrdinaryLeastSquares::new().fit(&x, &y, &["a", "b"]).unwrap_err();
        assert!(matches!(err, BrainregError::SingularMatrix { .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("3 elements");
        let y = Vector::from_slice(&[1.0, 2.0]);
        assert!(OrdinaryLeastSquares::new().fit(&x, &y, &["x"]).is_err());
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
        assert!(OrdinaryLeastSquares::new().fit(&x, &y, &["x", "z"]).is_err());
    }
}
