//! Descriptive statistics and distribution functions.
//!
//! Quantiles follow the R-7 definition (Hyndman & Fan 1996), the default in
//! R and `NumPy`, so posterior intervals line up with what coda reports.

pub mod distributions;

pub use distributions::{
    f_survival, ln_gamma, normal_cdf, normal_quantile, regularized_incomplete_beta,
    student_t_cdf, t_quantile, t_two_sided_pvalue,
};

use crate::error::{BrainregError, Result};

/// Arithmetic mean; `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); 0 for fewer than two values.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Pearson correlation; `NaN` if either side is constant or lengths differ.
#[must_use]
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let (ma, mb) = (mean(a), mean(b));
    let mut sab = 0.0;
    let mut saa = 0.0;
    let mut sbb = 0.0;
    for (x, y) in a.iter().zip(b) {
        sab += (x - ma) * (y - mb);
        saa += (x - ma).powi(2);
        sbb += (y - mb).powi(2);
    }
    if saa == 0.0 || sbb == 0.0 {
        return f64::NAN;
    }
    sab / (saa * sbb).sqrt()
}

fn validate(values: &[f64], q: f64) -> Result<()> {
    if values.is_empty() {
        return Err(BrainregError::empty_input("quantile of empty slice"));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(BrainregError::InvalidHyperparameter {
            param: "q".to_string(),
            value: q.to_string(),
            constraint: "in [0, 1]".to_string(),
        });
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err("quantile input contains NaN".into());
    }
    Ok(())
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    // R-7: h = (n - 1) * q
    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let fraction = h - lo as f64;
    sorted[lo] + fraction * (sorted[hi] - sorted[lo])
}

/// Compute a quantile using linear interpolation (R-7 method).
///
/// # Errors
/// Returns error if the slice is empty, contains NaN, or `q` is not in [0, 1].
///
/// # Examples
/// ```
/// use brainreg::stats::quantile;
///
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(quantile(&data, 0.5).expect("median of valid data"), 3.0);
/// assert_eq!(quantile(&data, 0.25).expect("lower quartile"), 2.0);
/// ```
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    validate(values, q)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(quantile_sorted(&sorted, q))
}

/// Compute several quantiles with a single sort.
///
/// # Errors
/// Same as [`quantile`], checked for every requested `q`.
pub fn quantiles(values: &[f64], qs: &[f64]) -> Result<Vec<f64>> {
    for &q in qs {
        validate(values, q)?;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(qs.iter().map(|&q| quantile_sorted(&sorted, q)).collect())
}
