//! Declarative model specifications and design construction.

use crate::data::DataFrame;
use crate::error::{BrainregError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Prior hyperparameters shared by both model families.
///
/// ```text
/// β_j, β₀, μ_α ~ N(0, 1 / coef_precision)
/// τ           ~ Gamma(noise_shape, noise_rate)
/// τ_α         ~ Gamma(group_shape, group_rate)
/// ```
///
/// Defaults are the customary vague choices (`dnorm(0, 1e-6)`,
/// `dgamma(0.001, 0.001)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priors {
    /// Precision of the normal prior on coefficients and the intercept mean
    pub coef_precision: f64,
    /// Gamma shape for the residual precision τ
    pub noise_shape: f64,
    /// Gamma rate for the residual precision τ
    pub noise_rate: f64,
    /// Gamma shape for the between-group precision τ_α
    pub group_shape: f64,
    /// Gamma rate for the between-group precision τ_α
    pub group_rate: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            coef_precision: 1e-6,
            noise_shape: 0.001,
            noise_rate: 0.001,
            group_shape: 0.001,
            group_rate: 0.001,
        }
    }
}

impl Priors {
    /// Checks every hyperparameter is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("coef_precision", self.coef_precision),
            ("noise_shape", self.noise_shape),
            ("noise_rate", self.noise_rate),
            ("group_shape", self.group_shape),
            ("group_rate", self.group_rate),
        ];
        for (param, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(BrainregError::InvalidHyperparameter {
                    param: param.to_string(),
                    value: value.to_string(),
                    constraint: "finite and > 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Which regression to fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// `y_i ~ N(β₀ + x_i·β, 1/τ)`
    Linear {
        /// Response column
        response: String,
        /// Covariate columns
        predictors: Vec<String>,
    },
    /// `y_i ~ N(α[g_i] + x_i·β, 1/τ)`, `α_g ~ N(μ_α, 1/τ_α)`
    Hierarchical {
        /// Response column
        response: String,
        /// Covariate columns (must not include `group`)
        predictors: Vec<String>,
        /// Categorical column whose levels index the intercepts
        group: String,
    },
}

impl ModelSpec {
    /// Short identifier (`linear` / `hierarchical`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::Hierarchical { .. } => "hierarchical",
        }
    }

    /// Response column.
    #[must_use]
    pub fn response(&self) -> &str {
        match self {
            Self::Linear { response, .. } | Self::Hierarchical { response, .. } => response,
        }
    }

    /// Covariate columns.
    #[must_use]
    pub fn predictors(&self) -> &[String] {
        match self {
            Self::Linear { predictors, .. } | Self::Hierarchical { predictors, .. } => predictors,
        }
    }

    /// Grouping column, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Linear { .. } => None,
            Self::Hierarchical { group, .. } => Some(group),
        }
    }

    /// Renders the model as BUGS-style text.
    ///
    /// # Examples
    ///
    /// ```
    /// use brainreg::bayesian::{ModelSpec, Priors};
    ///
    /// let spec = ModelSpec::Linear {
    ///     response: "MMSE".to_string(),
    ///     predictors: vec!["Age".to_string()],
    /// };
    /// let text = spec.to_model_string(&Priors::default());
    /// assert!(text.contains("MMSE[i] ~ dnorm(mu[i], tau)"));
    /// assert!(text.contains("beta[1] * Age[i]"));
    /// ```
    #[must_use]
    pub fn to_model_string(&self, priors: &Priors) -> String {
        let response = self.response();
        let predictors = self.predictors();
        let terms: String = predictors
            .iter()
            .enumerate()
            .map(|(j, name)| format!(" + beta[{}] * {}[i]", j + 1, name))
            .collect();
        let coef = priors.coef_precision;

        let mut s = String::new();
        s.push_str("model {\n");
        s.push_str("  for (i in 1:N) {\n");
        let _ = writeln!(s, "    {response}[i] ~ dnorm(mu[i], tau)");
        match self {
            Self::Linear { .. } => {
                let _ = writeln!(s, "    mu[i] <- beta0{terms}");
                s.push_str("  }\n");
                let _ = writeln!(s, "  beta0 ~ dnorm(0, {coef})");
            }
            Self::Hierarchical { group, .. } => {
                let _ = writeln!(s, "    mu[i] <- alpha[{group}[i]]{terms}");
                s.push_str("  }\n");
                s.push_str("  for (g in 1:G) {\n");
                s.push_str("    alpha[g] ~ dnorm(mu_alpha, tau_alpha)\n");
                s.push_str("  }\n");
                let _ = writeln!(s, "  mu_alpha ~ dnorm(0, {coef})");
                let _ = writeln!(
                    s,
                    "  tau_alpha ~ dgamma({}, {})",
                    priors.group_shape, priors.group_rate
                );
            }
        }
        if !predictors.is_empty() {
            s.push_str("  for (j in 1:P) {\n");
            let _ = writeln!(s, "    beta[j] ~ dnorm(0, {coef})");
            s.push_str("  }\n");
        }
        let _ = writeln!(
            s,
            "  tau ~ dgamma({}, {})",
            priors.noise_shape, priors.noise_rate
        );
        s.push('}');
        s
    }

    /// Builds the numeric design from a cleaned frame.
    ///
    /// With `center` set, each predictor has its sample mean subtracted so the
    /// intercept(s) describe a subject at the covariate means; this decorrelates
    /// intercept and slopes in the sampler.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is missing or the group column is also
    /// listed as a predictor.
    pub fn design(&self, frame: &DataFrame, center: bool) -> Result<Design> {
        let predictors: Vec<&str> = self.predictors().iter().map(String::as_str).collect();
        if let Some(group) = self.group() {
            if predictors.contains(&group) {
                return Err(format!("group column '{group}' is also listed as a predictor").into());
            }
        }

        let y = frame.column(self.response())?.clone();
        let mut x = frame.to_matrix(&predictors)?;

        let centers: Vec<f64> = if center {
            (0..x.n_cols()).map(|j| x.column(j).mean()).collect()
        } else {
            vec![0.0; x.n_cols()]
        };
        if center {
            for i in 0..x.n_rows() {
                for (j, c) in centers.iter().enumerate() {
                    x.set(i, j, x.get(i, j) - c);
                }
            }
        }

        let groups = match self.group() {
            Some(column) => Some(Grouping::from_values(
                column,
                frame.column(column)?.as_slice(),
            )?),
            None => None,
        };

        Ok(Design {
            response: self.response().to_string(),
            predictors: self.predictors().to_vec(),
            y,
            x,
            centers,
            groups,
        })
    }
}

/// Group membership derived from a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    /// Source column
    pub column: String,
    /// Distinct values, ascending
    pub levels: Vec<f64>,
    /// Level index for each row
    #[serde(skip)]
    pub index: Vec<usize>,
    /// Rows per level
    pub counts: Vec<usize>,
}

impl Grouping {
    /// Indexes rows by the sorted distinct values of `values`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input or NaN values.
    pub fn from_values(column: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(BrainregError::empty_input("group column"));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(format!("group column '{column}' contains NaN").into());
        }

        let mut levels = values.to_vec();
        levels.sort_by(f64::total_cmp);
        levels.dedup();

        let mut counts = vec![0usize; levels.len()];
        let index = values
            .iter()
            .map(|v| {
                // binary_search cannot miss: levels holds every value
                let g = levels
                    .binary_search_by(|level| level.total_cmp(v))
                    .unwrap_or_else(|pos| pos);
                counts[g] += 1;
                g
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            levels,
            index,
            counts,
        })
    }

    /// Number of levels.
    #[must_use]
    pub fn n_groups(&self) -> usize {
        self.levels.len()
    }

    /// Display label for level `g`, e.g. `SES=2`.
    #[must_use]
    pub fn label(&self, g: usize) -> String {
        format!("{}={}", self.column, self.levels[g])
    }
}

/// Numeric inputs to a sampler or predictor.
#[derive(Debug, Clone)]
pub struct Design {
    /// Response column name
    pub response: String,
    /// Predictor column names
    pub predictors: Vec<String>,
    /// Response values
    pub y: Vector<f64>,
    /// `n × p` predictors, no intercept column (centred if `centers` nonzero)
    pub x: Matrix<f64>,
    /// Value subtracted from each predictor
    pub centers: Vec<f64>,
    /// Group membership for hierarchical models
    pub groups: Option<Grouping>,
}

impl Design {
    /// Number of observations.
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    /// Number of predictors (intercepts excluded).
    #[must_use]
    pub fn n_predictors(&self) -> usize {
        self.x.n_cols()
    }
}
