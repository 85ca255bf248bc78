//! Full-conditional Gibbs updates for the flat and hierarchical models.
//!
//! Both models are conditionally conjugate:
//!
//! ```text
//! β | τ, y        ~ N(Q⁻¹ τXᵀr, Q⁻¹),  Q = τXᵀX + c·I
//! τ | β, y        ~ Gamma(a + n/2, b + RSS/2)
//! α_g | ...       ~ N((τ_α μ_α + τ Σ_g e_i) / (τ_α + n_g τ), 1 / (τ_α + n_g τ))
//! μ_α | α, τ_α    ~ N(τ_α Σ α_g / (c + G τ_α), 1 / (c + G τ_α))
//! τ_α | α, μ_α    ~ Gamma(a_α + G/2, b_α + Σ (α_g − μ_α)² / 2)
//! ```
//!
//! The coefficient block is drawn through the Cholesky factor of `Q`, so no
//! covariance matrix is ever formed explicitly.

use super::spec::{Design, Grouping, Priors};
use crate::error::{BrainregError, Result};
use crate::linear_model::INTERCEPT;
use crate::primitives::{Matrix, Vector};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Gamma, StandardNormal};
use std::ops::Range;

const MIN_PRECISION: f64 = 1e-12;
const MAX_PRECISION: f64 = 1e12;

/// Where each parameter group lives in a state vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    /// Intercept(s): one for the flat model, one per group otherwise
    pub intercepts: Range<usize>,
    /// Slopes, in predictor order
    pub slopes: Range<usize>,
    /// Residual precision τ
    pub precision: usize,
}

/// A model the sampler can drive.
///
/// The state vector has one slot per entry of [`GibbsModel::parameter_names`].
pub trait GibbsModel: Sync {
    /// Names of the monitored parameters.
    fn parameter_names(&self) -> Vec<String>;

    /// Position of intercepts, slopes and τ in the state.
    fn layout(&self) -> ParameterLayout;

    /// Dispersed starting point for chain `chain`.
    fn initial_state(&self, rng: &mut StdRng, chain: usize) -> Vec<f64>;

    /// One full sweep over all conditionals.
    ///
    /// # Errors
    ///
    /// Returns an error if a conditional precision matrix is not positive
    /// definite or a gamma draw is ill-posed.
    fn step(&self, rng: &mut StdRng, state: &mut [f64]) -> Result<()>;

    /// Values stored for a kept iteration.
    fn record(&self, state: &[f64]) -> Vec<f64> {
        state.to_vec()
    }
}

/// Gibbs sampler for `y ~ N(β₀ + Xβ, 1/τ)`.
#[derive(Debug, Clone)]
pub struct LinearGibbs {
    names: Vec<String>,
    x: Matrix<f64>,
    y: Vector<f64>,
    gram: Matrix<f64>,
    xty: Vector<f64>,
    priors: Priors,
}

impl LinearGibbs {
    /// Precomputes `XᵀX` and `Xᵀy` for the design with an intercept column.
    ///
    /// # Errors
    ///
    /// Returns an error for empty data or invalid priors.
    pub fn new(design: &Design, priors: &Priors) -> Result<Self> {
        priors.validate()?;
        if design.n_obs() < 2 {
            return Err(BrainregError::InsufficientSamples {
                needed: 1,
                got: design.n_obs(),
            });
        }

        let x = design.x.with_intercept_column();
        let gram = x.gram();
        let xty = x.t_matvec(&design.y)?;

        let mut names = Vec::with_capacity(design.n_predictors() + 2);
        names.push(INTERCEPT.to_string());
        names.extend(design.predictors.iter().cloned());
        names.push("tau".to_string());

        Ok(Self {
            names,
            x,
            y: design.y.clone(),
            gram,
            xty,
            priors: priors.clone(),
        })
    }

    fn n_coef(&self) -> usize {
        self.x.n_cols()
    }
}

impl GibbsModel for LinearGibbs {
    fn parameter_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn layout(&self) -> ParameterLayout {
        let k = self.n_coef();
        ParameterLayout {
            intercepts: 0..1,
            slopes: 1..k,
            precision: k,
        }
    }

    fn initial_state(&self, rng: &mut StdRng, _chain: usize) -> Vec<f64> {
        let k = self.n_coef();
        let mut state = vec![0.0; k + 1];
        let sd = self.y.variance().sqrt();
        state[0] = self.y.mean() + sd * standard_normal(rng);
        state[k] = overdispersed_precision(&self.y, rng);
        state
    }

    fn step(&self, rng: &mut StdRng, state: &mut [f64]) -> Result<()> {
        let k = self.n_coef();
        let tau = state[k];

        let b = self.xty.mul_scalar(tau);
        let beta = draw_coefficients(&self.gram, tau, self.priors.coef_precision, b.as_slice(), rng)?;
        state[..k].copy_from_slice(&beta);

        let fitted = self.x.matvec(&Vector::from_vec(beta))?;
        let rss: f64 = self
            .y
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| (y - f).powi(2))
            .sum();
        state[k] = draw_precision(
            rng,
            self.priors.noise_shape + self.y.len() as f64 / 2.0,
            self.priors.noise_rate + rss / 2.0,
        )?;
        Ok(())
    }
}

/// Gibbs sampler for per-group intercepts with shared slopes.
#[derive(Debug, Clone)]
pub struct HierarchicalGibbs {
    names: Vec<String>,
    x: Matrix<f64>,
    y: Vector<f64>,
    gram: Matrix<f64>,
    groups: Grouping,
    priors: Priors,
}

impl HierarchicalGibbs {
    /// Builds the sampler from a design carrying group membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the design has no grouping, too few rows, or the
    /// priors are invalid.
    pub fn new(design: &Design, priors: &Priors) -> Result<Self> {
        priors.validate()?;
        let groups = design
            .groups
            .clone()
            .ok_or_else(|| BrainregError::from("hierarchical model requires a group column"))?;
        if design.n_obs() < 2 {
            return Err(BrainregError::InsufficientSamples {
                needed: 1,
                got: design.n_obs(),
            });
        }

        let mut names: Vec<String> = (0..groups.n_groups())
            .map(|g| format!("alpha[{}]", groups.label(g)))
            .collect();
        names.extend(design.predictors.iter().cloned());
        names.extend(["mu_alpha", "tau_alpha", "tau"].map(String::from));

        Ok(Self {
            names,
            x: design.x.clone(),
            y: design.y.clone(),
            gram: design.x.gram(),
            groups,
            priors: priors.clone(),
        })
    }

    fn n_groups(&self) -> usize {
        self.groups.n_groups()
    }

    fn n_slopes(&self) -> usize {
        self.x.n_cols()
    }

    fn mu_alpha_index(&self) -> usize {
        self.n_groups() + self.n_slopes()
    }

    /// `X β` with an all-zero slope vector when there are no predictors.
    fn linear_part(&self, beta: &[f64]) -> Result<Vector<f64>> {
        if beta.is_empty() {
            return Ok(Vector::zeros(self.y.len()));
        }
        Ok(self.x.matvec(&Vector::from_slice(beta))?)
    }
}

impl GibbsModel for HierarchicalGibbs {
    fn parameter_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn layout(&self) -> ParameterLayout {
        let g = self.n_groups();
        let p = self.n_slopes();
        ParameterLayout {
            intercepts: 0..g,
            slopes: g..g + p,
            precision: g + p + 2,
        }
    }

    fn initial_state(&self, rng: &mut StdRng, _chain: usize) -> Vec<f64> {
        let g = self.n_groups();
        let p = self.n_slopes();
        let mut state = vec![0.0; g + p + 3];
        let mean = self.y.mean();
        let sd = self.y.variance().sqrt();
        for alpha in &mut state[..g] {
            *alpha = mean + sd * standard_normal(rng);
        }
        state[g + p] = mean;
        state[g + p + 1] = overdispersed_precision(&self.y, rng);
        state[g + p + 2] = overdispersed_precision(&self.y, rng);
        state
    }

    fn step(&self, rng: &mut StdRng, state: &mut [f64]) -> Result<()> {
        let n_groups = self.n_groups();
        let p = self.n_slopes();
        let mu_idx = self.mu_alpha_index();
        let (tau_alpha_idx, tau_idx) = (mu_idx + 1, mu_idx + 2);
        let c = self.priors.coef_precision;
        let n = self.y.len();

        // slopes given intercepts
        if p > 0 {
            let tau = state[tau_idx];
            let partial: Vec<f64> = (0..n)
                .map(|i| self.y[i] - state[self.groups.index[i]])
                .collect();
            let b = self.x.t_matvec(&Vector::from_vec(partial))?.mul_scalar(tau);
            let beta = draw_coefficients(&self.gram, tau, c, b.as_slice(), rng)?;
            state[n_groups..n_groups + p].copy_from_slice(&beta);
        }

        // group intercepts given slopes
        let xb = self.linear_part(&state[n_groups..n_groups + p])?;
        let mut sums = vec![0.0; n_groups];
        for i in 0..n {
            sums[self.groups.index[i]] += self.y[i] - xb[i];
        }
        let (tau, tau_alpha, mu_alpha) = (state[tau_idx], state[tau_alpha_idx], state[mu_idx]);
        for (g, sum) in sums.iter().enumerate() {
            let precision = tau_alpha + self.groups.counts[g] as f64 * tau;
            let mean = (tau_alpha * mu_alpha + tau * sum) / precision;
            state[g] = mean + standard_normal(rng) / precision.sqrt();
        }

        // hyper-mean
        let alpha_sum: f64 = state[..n_groups].iter().sum();
        let precision = c + n_groups as f64 * tau_alpha;
        state[mu_idx] = tau_alpha * alpha_sum / precision + standard_normal(rng) / precision.sqrt();

        // hyper-precision
        let mu_alpha = state[mu_idx];
        let spread: f64 = state[..n_groups].iter().map(|a| (a - mu_alpha).powi(2)).sum();
        state[tau_alpha_idx] = draw_precision(
            rng,
            self.priors.group_shape + n_groups as f64 / 2.0,
            self.priors.group_rate + spread / 2.0,
        )?;

        // residual precision
        let rss: f64 = (0..n)
            .map(|i| (self.y[i] - state[self.groups.index[i]] - xb[i]).powi(2))
            .sum();
        state[tau_idx] = draw_precision(
            rng,
            self.priors.noise_shape + n as f64 / 2.0,
            self.priors.noise_rate + rss / 2.0,
        )?;
        Ok(())
    }
}

fn standard_normal(rng: &mut StdRng) -> f64 {
    rng.sample::<f64, _>(StandardNormal)
}

/// Draws from `N(Q⁻¹b, Q⁻¹)` with `Q = τ·gram + c·I`.
///
/// With `Q = LLᵀ`: `w = L⁻¹b`, `β = L⁻ᵀ(w + z)`, `z ~ N(0, I)`.
fn draw_coefficients(
    gram: &Matrix<f64>,
    tau: f64,
    prior_precision: f64,
    b: &[f64],
    rng: &mut StdRng,
) -> Result<Vec<f64>> {
    let q = gram.mul_scalar(tau).add_diagonal(prior_precision);
    let l = q
        .cholesky()
        .map_err(|_| BrainregError::singular("coefficient full conditional"))?;
    let mut w = l.solve_lower(b)?;
    for wi in &mut w {
        *wi += standard_normal(rng);
    }
    l.solve_upper_transposed(&w)
}

/// Draws a precision from `Gamma(shape, rate)`, clamped to a finite band.
fn draw_precision(rng: &mut StdRng, shape: f64, rate: f64) -> Result<f64> {
    let gamma = Gamma::new(shape, 1.0 / rate).map_err(|e| {
        BrainregError::Other(format!("gamma(shape={shape}, rate={rate}): {e}"))
    })?;
    Ok(rng.sample(gamma).clamp(MIN_PRECISION, MAX_PRECISION))
}

/// `1/var(y)` scaled by a log-normal factor so chains start apart.
fn overdispersed_precision(y: &Vector<f64>, rng: &mut StdRng) -> f64 {
    let var = y.variance();
    let base = if var.is_finite() && var > 0.0 { 1.0 / var } else { 1.0 };
    (base * standard_normal(rng).exp()).clamp(MIN_PRECISION, MAX_PRECISION)
}

#[cfg(test)]
#[path = "gibbs_tests.rs"]
mod tests;
