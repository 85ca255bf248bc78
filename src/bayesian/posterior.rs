//! Posterior draws, summaries and point predictions.

use super::diagnostics::{effective_sample_size, gelman_rubin, ConvergenceReport};
use super::gibbs::ParameterLayout;
use super::spec::Design;
use crate::error::{BrainregError, Result};
use crate::primitives::Vector;
use serde::Serialize;

/// Kept draws from one chain; `draws[t][k]` is parameter `k` at iteration `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Draws in iteration order
    pub draws: Vec<Vec<f64>>,
}

/// Draws from every chain of one sampler run.
#[derive(Debug, Clone)]
pub struct Posterior {
    names: Vec<String>,
    chains: Vec<Chain>,
}

impl Posterior {
    /// Wraps chains, checking every draw has one value per name.
    ///
    /// # Errors
    ///
    /// Returns an error for zero chains, empty chains or ragged draws.
    pub fn new(names: Vec<String>, chains: Vec<Chain>) -> Result<Self> {
        if chains.is_empty() {
            return Err(BrainregError::empty_input("posterior has no chains"));
        }
        let len = chains[0].draws.len();
        if len == 0 {
            return Err(BrainregError::empty_input("posterior chain has no draws"));
        }
        for chain in &chains {
            if chain.draws.len() != len {
                return Err(BrainregError::dimension_mismatch(
                    "draws per chain",
                    len,
                    chain.draws.len(),
                ));
            }
            if let Some(bad) = chain.draws.iter().find(|d| d.len() != names.len()) {
                return Err(BrainregError::dimension_mismatch(
                    "parameters",
                    names.len(),
                    bad.len(),
                ));
            }
        }
        Ok(Self { names, chains })
    }

    /// Parameter names in state order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of chains.
    #[must_use]
    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Kept draws per chain.
    #[must_use]
    pub fn draws_per_chain(&self) -> usize {
        self.chains[0].draws.len()
    }

    /// Raw chains.
    #[must_use]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Index of `name`, if monitored.
    #[must_use]
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Per-chain traces for parameter `k`.
    #[must_use]
    pub fn chain_draws(&self, k: usize) -> Vec<Vec<f64>> {
        self.chains
            .iter()
            .map(|c| c.draws.iter().map(|d| d[k]).collect())
            .collect()
    }

    /// Per-chain traces for a named parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not monitored.
    pub fn parameter_draws(&self, name: &str) -> Result<Vec<Vec<f64>>> {
        let k = self.parameter_index(name).ok_or_else(|| BrainregError::MissingColumn {
            column: name.to_string(),
            available: self.names.join(", "),
        })?;
        Ok(self.chain_draws(k))
    }

    /// All chains of parameter `k` concatenated.
    #[must_use]
    pub fn pooled(&self, k: usize) -> Vec<f64> {
        self.chain_draws(k).into_iter().flatten().collect()
    }

    /// Posterior mean of every parameter.
    #[must_use]
    pub fn posterior_means(&self) -> Vec<f64> {
        (0..self.names.len())
            .map(|k| crate::stats::mean(&self.pooled(k)))
            .collect()
    }

    /// Per-parameter summary table.
    ///
    /// # Errors
    ///
    /// Propagates quantile errors (never raised for a validated posterior).
    pub fn summary(&self) -> Result<Vec<ParameterSummary>> {
        self.names
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let chains = self.chain_draws(k);
                let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
                let mean = crate::stats::mean(&pooled);
                let sd = crate::stats::std_dev(&pooled);
                let ess = effective_sample_size(&chains);
                let q = crate::stats::quantiles(&pooled, &[0.025, 0.25, 0.5, 0.75, 0.975])?;
                Ok(ParameterSummary {
                    name: name.clone(),
                    mean,
                    sd: if sd.is_nan() { 0.0 } else { sd },
                    naive_se: if sd.is_nan() { 0.0 } else { sd / (pooled.len() as f64).sqrt() },
                    time_series_se: if sd.is_nan() || ess <= 0.0 { 0.0 } else { sd / ess.sqrt() },
                    q2_5: q[0],
                    q25: q[1],
                    q50: q[2],
                    q75: q[3],
                    q97_5: q[4],
                    r_hat: gelman_rubin(&chains),
                    ess,
                })
            })
            .collect()
    }

    /// Convergence diagnostics for every parameter.
    #[must_use]
    pub fn convergence(&self) -> Vec<ConvergenceReport> {
        self.names
            .iter()
            .enumerate()
            .map(|(k, name)| ConvergenceReport::compute(name, &self.chain_draws(k)))
            .collect()
    }
}

/// Posterior summary statistics for one parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSummary {
    /// Parameter name
    pub name: String,
    /// Posterior mean
    pub mean: f64,
    /// Posterior standard deviation
    pub sd: f64,
    /// `sd / √N` ignoring autocorrelation
    pub naive_se: f64,
    /// `sd / √ESS` (Monte Carlo standard error)
    pub time_series_se: f64,
    /// 2.5% quantile
    pub q2_5: f64,
    /// 25% quantile
    pub q25: f64,
    /// Median
    pub q50: f64,
    /// 75% quantile
    pub q75: f64,
    /// 97.5% quantile
    pub q97_5: f64,
    /// Potential scale reduction factor (needs ≥ 2 chains)
    pub r_hat: Option<f64>,
    /// Effective sample size summed over chains
    pub ess: f64,
}

/// Posterior-mean coefficients used for prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PointEstimate {
    /// One intercept (flat model) or one per group level
    pub intercepts: Vec<f64>,
    /// Slopes in predictor order
    pub slopes: Vec<f64>,
    /// Posterior mean of τ
    pub precision: f64,
}

impl PointEstimate {
    /// Posterior means arranged by `layout`.
    #[must_use]
    pub fn from_posterior(posterior: &Posterior, layout: &ParameterLayout) -> Self {
        let means = posterior.posterior_means();
        Self {
            intercepts: means[layout.intercepts.clone()].to_vec(),
            slopes: means[layout.slopes.clone()].to_vec(),
            precision: means[layout.precision],
        }
    }

    /// Intercept(s) followed by slopes.
    #[must_use]
    pub fn coefficients(&self) -> Vec<f64> {
        self.intercepts
            .iter()
            .chain(self.slopes.iter())
            .copied()
            .collect()
    }

    /// Intercepts re-expressed for uncentred predictors: `α − Σ β_j c_j`.
    ///
    /// Comparable with an OLS intercept fitted on raw covariates.
    #[must_use]
    pub fn intercepts_at_origin(&self, centers: &[f64]) -> Vec<f64> {
        let shift: f64 = self.slopes.iter().zip(centers).map(|(b, c)| b * c).sum();
        self.intercepts.iter().map(|a| a - shift).collect()
    }

    /// `ŷ_i = intercept[g_i] + x_i·β` on the design's (possibly centred) scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the slope count does not match the design or group
    /// structure disagrees with the number of intercepts.
    pub fn predict(&self, design: &Design) -> Result<Vector<f64>> {
        if self.slopes.len() != design.n_predictors() {
            return Err(BrainregError::dimension_mismatch(
                "slopes",
                design.n_predictors(),
                self.slopes.len(),
            ));
        }
        let expected_intercepts = design.groups.as_ref().map_or(1, |g| g.n_groups());
        if self.intercepts.len() != expected_intercepts {
            return Err(BrainregError::dimension_mismatch(
                "intercepts",
                expected_intercepts,
                self.intercepts.len(),
            ));
        }

        let beta = Vector::from_slice(&self.slopes);
        let predictions = (0..design.n_obs())
            .map(|i| {
                let g = design.groups.as_ref().map_or(0, |gr| gr.index[i]);
                self.intercepts[g] + design.x.row(i).dot(&beta)
            })
            .collect();
        Ok(Vector::from_vec(predictions))
    }

    /// `y_i − ŷ_i`.
    ///
    /// # Errors
    ///
    /// Same as [`PointEstimate::predict`].
    pub fn residuals(&self, design: &Design) -> Result<Vector<f64>> {
        let fitted = self.predict(design)?;
        Ok(design.y.sub(&fitted)?)
    }
}

#[cfg(test)]
#[path = "posterior_tests.rs"]
mod tests;
