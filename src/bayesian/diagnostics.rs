//! Convergence diagnostics for MCMC chains
//!
//! Implements the potential scale reduction factor (R̂), effective sample
//! size (ESS), Geweke's z-score and autocorrelation analysis.
//!
//! Reference: Gelman et al. (2013), "Bayesian Data Analysis", Ch. 11

use serde::Serialize;

/// Lags reported by [`autocorrelation_profile`] by default.
pub const DEFAULT_ACF_LAGS: [usize; 5] = [0, 1, 5, 10, 50];

/// Default R̂ threshold below which a parameter counts as converged.
pub const DEFAULT_RHAT_THRESHOLD: f64 = 1.1;

/// Autocorrelation at a given lag
///
/// Returns 0 for lags beyond the series, and for nonzero lags of a constant
/// series.
#[must_use]
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag >= n {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance: f64 = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

    if variance < 1e-15 {
        return if lag == 0 { 1.0 } else { 0.0 };
    }

    let covariance: f64 = values[..n - lag]
        .iter()
        .zip(values[lag..].iter())
        .map(|(x, y)| (x - mean) * (y - mean))
        .sum::<f64>()
        / n as f64;

    covariance / variance
}

/// Autocorrelation at each of `lags`, as `(lag, rho)` pairs.
#[must_use]
pub fn autocorrelation_profile(values: &[f64], lags: &[usize]) -> Vec<(usize, f64)> {
    lags.iter()
        .map(|&lag| (lag, autocorrelation(values, lag)))
        .collect()
}

/// ESS of a single chain using Geyer's initial positive sequence
///
/// Autocorrelations are summed in adjacent pairs `ρ(2k) + ρ(2k+1)` while the
/// pair sums stay positive; `ESS = n / (-1 + 2 Σ pairs)`.
#[must_use]
pub fn ess_single_chain(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return n as f64;
    }

    let mut pair_sum = 0.0;
    let mut k = 0;
    while 2 * k + 1 < n {
        let pair = autocorrelation(values, 2 * k) + autocorrelation(values, 2 * k + 1);
        if pair <= 0.0 {
            break;
        }
        pair_sum += pair;
        k += 1;
    }

    let tau = -1.0 + 2.0 * pair_sum;
    if tau > 0.0 {
        (n as f64 / tau).min(n as f64)
    } else {
        n as f64
    }
}

/// ESS summed over chains.
#[must_use]
pub fn effective_sample_size(chains: &[Vec<f64>]) -> f64 {
    chains.iter().map(|c| ess_single_chain(c)).sum()
}

/// Gelman-Rubin potential scale reduction factor
///
/// ```text
/// W = mean within-chain variance
/// B = n · var(chain means)
/// V̂ = (n-1)/n · W + B/n
/// R̂ = √(V̂ / W)
/// ```
///
/// Returns `None` with fewer than two chains or fewer than two draws in the
/// shortest chain. A chain set with zero within-chain variance yields 1.0
/// when the chains agree and infinity otherwise.
#[must_use]
pub fn gelman_rubin(chains: &[Vec<f64>]) -> Option<f64> {
    let m = chains.len();
    let n = chains.iter().map(Vec::len).min()?;
    if m < 2 || n < 2 {
        return None;
    }

    let means: Vec<f64> = chains
        .iter()
        .map(|c| c[..n].iter().sum::<f64>() / n as f64)
        .collect();
    let grand = means.iter().sum::<f64>() / m as f64;

    let b = n as f64 * means.iter().map(|mu| (mu - grand).powi(2)).sum::<f64>() / (m - 1) as f64;
    let w = chains
        .iter()
        .zip(&means)
        .map(|(c, mu)| c[..n].iter().map(|x| (x - mu).powi(2)).sum::<f64>() / (n - 1) as f64)
        .sum::<f64>()
        / m as f64;

    if w < 1e-300 {
        return Some(if b < 1e-300 { 1.0 } else { f64::INFINITY });
    }

    let v_hat = (n - 1) as f64 / n as f64 * w + b / n as f64;
    Some((v_hat / w).sqrt())
}

/// Geweke z-score comparing the first `first` and last `last` fractions of a
/// chain, using spectral-density-free variances scaled by ESS.
///
/// Returns `None` if either window holds fewer than two draws or the fractions
/// overlap.
#[must_use]
pub fn geweke_z(values: &[f64], first: f64, last: f64) -> Option<f64> {
    if !(first > 0.0 && last > 0.0 && first + last <= 1.0) {
        return None;
    }
    let n = values.len();
    let n_a = (first * n as f64).floor() as usize;
    let n_b = (last * n as f64).floor() as usize;
    if n_a < 2 || n_b < 2 {
        return None;
    }

    let a = &values[..n_a];
    let b = &values[n - n_b..];
    let (mean_a, var_a) = (crate::stats::mean(a), crate::stats::variance(a));
    let (mean_b, var_b) = (crate::stats::mean(b), crate::stats::variance(b));

    let se2 = var_a / ess_single_chain(a) + var_b / ess_single_chain(b);
    if se2 <= 0.0 {
        return Some(0.0);
    }
    Some((mean_a - mean_b) / se2.sqrt())
}

/// Convergence summary for one parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceReport {
    /// Parameter name
    pub parameter: String,
    /// Potential scale reduction factor
    pub r_hat: Option<f64>,
    /// Effective sample size over all chains
    pub ess: f64,
    /// Geweke z-score of the first chain (10% vs 50%)
    pub geweke_z: Option<f64>,
    /// Pooled autocorrelation at [`DEFAULT_ACF_LAGS`]
    pub autocorrelation: Vec<(usize, f64)>,
}

impl ConvergenceReport {
    /// Computes every diagnostic for one parameter's chains.
    #[must_use]
    pub fn compute(parameter: &str, chains: &[Vec<f64>]) -> Self {
        let first = chains.first().map(Vec::as_slice).unwrap_or(&[]);
        Self {
            parameter: parameter.to_string(),
            r_hat: gelman_rubin(chains),
            ess: effective_sample_size(chains),
            geweke_z: geweke_z(first, 0.1, 0.5),
            autocorrelation: autocorrelation_profile(first, &DEFAULT_ACF_LAGS),
        }
    }

    /// `true` if R̂ is available and below `threshold`.
    #[must_use]
    pub fn converged(&self, threshold: f64) -> bool {
        self.r_hat.is_some_and(|r| r < threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn white_noise(n: usize, seed: u64, shift: f64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| shift + rng.sample::<f64, _>(StandardNormal))
            .collect()
    }

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = 0.0;
        (0..n)
            .map(|_| {
                x = phi * x + rng.sample::<f64, _>(StandardNormal);
                x
            })
            .collect()
    }

    #[test]
    fn test_autocorrelation_lag_zero() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((autocorrelation(&values, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_autocorrelation_constant_series() {
        let values = vec![2.0; 20];
        assert_eq!(autocorrelation(&values, 0), 1.0);
        assert_eq!(autocorrelation(&values, 3), 0.0);
    }

    #[test]
    fn test_autocorrelation_beyond_series() {
        assert_eq!(autocorrelation(&[1.0, 2.0], 5), 0.0);
    }

    #[test]
    fn test_profile_default_lags() {
        let values = ar1(2000, 0.9, 3);
        let profile = autocorrelation_profile(&values, &DEFAULT_ACF_LAGS);
        assert_eq!(profile.len(), 5);
        assert_eq!(profile[0].0, 0);
        assert!((profile[0].1 - 1.0).abs() < 1e-12);
        assert!(profile[1].1 > 0.8);
        assert!(profile[1].1 > profile[2].1);
        assert!(profile[4].1.abs() < 0.2);
    }

    #[test]
    fn test_ess_white_noise_close_to_n() {
        let values = white_noise(4000, 7, 0.0);
        let ess = ess_single_chain(&values);
        assert!(ess > 3000.0 && ess <= 4000.0, "ess {ess}");
    }

    #[test]
    fn test_ess_ar1_reduced() {
        // integrated autocorrelation time (1+φ)/(1-φ) = 19
        let values = ar1(20_000, 0.9, 5);
        let ess = ess_single_chain(&values);
        assert!(ess > 500.0 && ess < 2000.0, "ess {ess}");
    }

    #[test]
    fn test_effective_sample_size_sums_chains() {
        let chains = vec![white_noise(1000, 1, 0.0), white_noise(1000, 2, 0.0)];
        let total = effective_sample_size(&chains);
        let parts = ess_single_chain(&chains[0]) + ess_single_chain(&chains[1]);
        assert!((total - parts).abs() < 1e-9);
    }

    #[test]
    fn test_gelman_rubin_mixed_chains() {
        let chains: Vec<Vec<f64>> = (0..4).map(|s| white_noise(1000, s, 0.0)).collect();
        let r = gelman_rubin(&chains).expect("enough chains");
        assert!(r < 1.02, "r_hat {r}");
    }

    #[test]
    fn test_gelman_rubin_separated_chains() {
        let chains = vec![white_noise(500, 1, 0.0), white_noise(500, 2, 10.0)];
        let r = gelman_rubin(&chains).expect("enough chains");
        assert!(r > 2.0, "r_hat {r}");
    }

    #[test]
    fn test_gelman_rubin_needs_two_chains() {
        assert!(gelman_rubin(&[white_noise(100, 1, 0.0)]).is_none());
        assert!(gelman_rubin(&[vec![1.0], vec![2.0]]).is_none());
        assert!(gelman_rubin(&[]).is_none());
    }

    #[test]
    fn test_gelman_rubin_constant_chains() {
        assert_eq!(gelman_rubin(&[vec![1.0; 10], vec![1.0; 10]]), Some(1.0));
        assert_eq!(
            gelman_rubin(&[vec![1.0; 10], vec![2.0; 10]]),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_geweke_stationary_and_drifting() {
        let stationary = white_noise(2000, 11, 0.0);
        let z = geweke_z(&stationary, 0.1, 0.5).expect("long enough");
        assert!(z.abs() < 4.0, "z {z}");

        let drifting: Vec<f64> = (0..2000).map(|i| i as f64 / 100.0).collect();
        let z = geweke_z(&drifting, 0.1, 0.5).expect("long enough");
        assert!(z < -4.0, "z {z}");
    }

    #[test]
    fn test_geweke_rejects_bad_windows() {
        let values = white_noise(100, 1, 0.0);
        assert!(geweke_z(&values, 0.6, 0.5).is_none());
        assert!(geweke_z(&values[..5], 0.1, 0.5).is_none());
    }

    #[test]
    fn test_convergence_report() {
        let chains: Vec<Vec<f64>> = (0..3).map(|s| white_noise(800, s, 0.0)).collect();
        let report = ConvergenceReport::compute("beta", &chains);
        assert!(report.converged(DEFAULT_RHAT_THRESHOLD));
        assert!(report.ess > 1000.0);
        assert_eq!(report.autocorrelation.len(), 5);

        let single = ConvergenceReport::compute("beta", &chains[..1]);
        assert!(single.r_hat.is_none());
        assert!(!single.converged(DEFAULT_RHAT_THRESHOLD));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_ess_bounded(values in prop::collection::vec(0.0..100.0f64, 10..300)) {
                let ess = ess_single_chain(&values);
                prop_assert!(ess > 0.0);
                prop_assert!(ess <= values.len() as f64);
            }

            #[test]
            fn prop_autocorr_bounded(values in prop::collection::vec(-10.0..10.0f64, 20..200)) {
                for lag in 1..5 {
                    let rho = autocorrelation(&values, lag);
                    prop_assert!((-1.0..=1.0).contains(&rho), "Autocorrelation out of bounds: {rho}");
                }
            }

            #[test]
            fn prop_rhat_at_least_near_one(
                a in prop::collection::vec(-5.0..5.0f64, 20..100),
                b in prop::collection::vec(-5.0..5.0f64, 20..100),
            ) {
                if let Some(r) = gelman_rubin(&[a, b]) {
                    prop_assert!(r >= 0.0);
                }
            }
        }
    }
}
